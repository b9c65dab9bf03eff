use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::stmt::Value;

macro_rules! impl_chrono_conversions {
    ($chrono:ty, $name:ident) => {
        impl From<$chrono> for Value {
            fn from(value: $chrono) -> Self {
                Self::$name(value)
            }
        }

        impl From<&$chrono> for Value {
            fn from(value: &$chrono) -> Self {
                Self::$name(*value)
            }
        }
    };
}

impl_chrono_conversions!(DateTime<Utc>, TimestampTz);
impl_chrono_conversions!(NaiveDateTime, Timestamp);
impl_chrono_conversions!(NaiveDate, Date);
impl_chrono_conversions!(NaiveTime, Time);

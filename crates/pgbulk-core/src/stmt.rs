mod ty;
pub use ty::Type;

mod value;
pub use value::Value;

mod value_chrono;

mod value_record;
pub use value_record::ValueRecord;

mod value_type;
pub use value_type::ValueType;

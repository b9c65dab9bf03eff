/// Implements [`Record`](crate::schema::Record) for a plain struct.
///
/// Every listed field becomes a property named after the field, or after the
/// string given with `as`. An optional trailing `=> expr` supplies the
/// descriptor returned by `Record::describe`.
///
/// ```
/// # use pgbulk_core::{record, TableDescriptor};
/// #[derive(Default)]
/// struct Person {
///     id: i64,
///     name: String,
///     age: Option<i32>,
/// }
///
/// record!(Person {
///     id as "Id",
///     name as "Name",
///     age as "Age",
/// } => TableDescriptor::builder("people").primary_key("Id").build());
/// ```
#[macro_export]
macro_rules! record {
    (@name $field:ident) => {
        stringify!($field)
    };
    (@name $field:ident $rename:literal) => {
        $rename
    };
    (
        $ty:ty {
            $( $field:ident $( as $rename:literal )? ),* $(,)?
        }
        $( => $describe:expr )?
    ) => {
        impl $crate::schema::Record for $ty {
            fn properties() -> ::std::vec::Vec<$crate::schema::Property> {
                ::std::vec![
                    $(
                        $crate::schema::Property::of(
                            $crate::record!(@name $field $( $rename )?),
                            |record: &$ty| &record.$field,
                        ),
                    )*
                ]
            }

            fn get(&self, name: &str) -> ::std::option::Option<$crate::stmt::Value> {
                $(
                    if name == $crate::record!(@name $field $( $rename )?) {
                        return ::std::option::Option::Some(
                            $crate::stmt::ValueType::to_value(&self.$field),
                        );
                    }
                )*
                ::std::option::Option::None
            }

            fn set(&mut self, name: &str, value: $crate::stmt::Value) -> $crate::Result<()> {
                $(
                    if name == $crate::record!(@name $field $( $rename )?) {
                        self.$field = $crate::stmt::ValueType::from_value(value)?;
                        return ::std::result::Result::Ok(());
                    }
                )*
                ::std::result::Result::Err($crate::Error::configuration(::std::format!(
                    "type `{}` has no property `{}`",
                    stringify!($ty),
                    name
                )))
            }

            $(
                fn describe() -> ::std::option::Option<$crate::schema::TableDescriptor> {
                    ::std::option::Option::Some($describe)
                }
            )?
        }
    };
}

/// Implements [`ValueType`](crate::stmt::ValueType) for a field-less enum,
/// storing each variant as the integer given for it.
///
/// The property is reported as [`Type::Enum`](crate::stmt::Type::Enum) and
/// staged as `integer`. Reading back an integer with no matching variant is
/// a type conversion error.
///
/// ```
/// # use pgbulk_core::{stmt::{Type, Value, ValueType}, value_enum};
/// enum Status {
///     Open,
///     Closed,
/// }
///
/// value_enum!(Status {
///     Open = 1,
///     Closed = 2,
/// });
///
/// assert_eq!(Status::ty(), Type::Enum);
/// assert_eq!(Status::Closed.to_value(), Value::I32(2));
/// ```
#[macro_export]
macro_rules! value_enum {
    (
        $ty:ty {
            $( $variant:ident = $discriminant:literal ),* $(,)?
        }
    ) => {
        impl $crate::stmt::ValueType for $ty {
            fn ty() -> $crate::stmt::Type {
                $crate::stmt::Type::Enum
            }

            fn to_value(&self) -> $crate::stmt::Value {
                $crate::stmt::Value::I32(match self {
                    $( Self::$variant => $discriminant, )*
                })
            }

            fn from_value(value: $crate::stmt::Value) -> $crate::Result<Self> {
                match $crate::stmt::Type::Enum.cast(value)? {
                    $( $crate::stmt::Value::I32($discriminant) => ::std::result::Result::Ok(Self::$variant), )*
                    value => ::std::result::Result::Err($crate::Error::type_conversion(
                        value,
                        stringify!($ty),
                    )),
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::schema::{Property, Record};
    use crate::stmt::{Type, Value, ValueType};
    use crate::TableDescriptor;

    #[derive(Debug, Default, PartialEq)]
    struct Item {
        id: i64,
        name: String,
        qty: Option<i32>,
    }

    record!(Item {
        id as "Id",
        name,
        qty as "Quantity",
    } => TableDescriptor::builder("items").primary_key("Id").build());

    #[test]
    fn properties_follow_declaration_order() {
        assert_eq!(
            Item::properties(),
            vec![
                Property::new("Id", Type::I64, false),
                Property::new("name", Type::String, false),
                Property::new("Quantity", Type::I32, true),
            ]
        );
    }

    #[test]
    fn get_and_set() {
        let mut item = Item::default();
        item.set("Id", Value::I32(4)).unwrap();
        item.set("name", Value::from("bolt")).unwrap();
        item.set("Quantity", Value::Null).unwrap();

        assert_eq!(
            item,
            Item {
                id: 4,
                name: "bolt".into(),
                qty: None
            }
        );
        assert_eq!(item.get("Id"), Some(Value::I64(4)));
        assert_eq!(item.get("id"), None);
    }

    #[test]
    fn set_unknown_property() {
        let mut item = Item::default();
        let err = item.set("Missing", Value::Null).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn describe_from_macro() {
        let descriptor = Item::describe().unwrap();
        assert_eq!(descriptor.name(), "items");
    }

    #[derive(Debug, Default, Clone, Copy, PartialEq)]
    enum Status {
        #[default]
        Open,
        Closed,
    }

    value_enum!(Status {
        Open = 0,
        Closed = 7,
    });

    #[derive(Debug, Default, PartialEq)]
    struct Ticket {
        id: i64,
        status: Status,
        previous: Option<Status>,
    }

    record!(Ticket {
        id as "Id",
        status as "Status",
        previous as "Previous",
    });

    #[test]
    fn enum_properties_are_integers() {
        assert_eq!(
            Ticket::properties(),
            vec![
                Property::new("Id", Type::I64, false),
                Property::new("Status", Type::Enum, false),
                Property::new("Previous", Type::Enum, true),
            ]
        );

        let ticket = Ticket {
            id: 1,
            status: Status::Closed,
            previous: Some(Status::Open),
        };
        assert_eq!(ticket.get("Status"), Some(Value::I32(7)));
        assert_eq!(ticket.get("Previous"), Some(Value::I32(0)));
    }

    #[test]
    fn enum_from_integer() {
        let mut ticket = Ticket::default();
        ticket.set("Status", Value::I64(7)).unwrap();
        ticket.set("Previous", Value::Null).unwrap();
        assert_eq!(ticket.status, Status::Closed);
        assert_eq!(ticket.previous, None);

        let err = Status::from_value(Value::I32(3)).unwrap_err();
        assert!(err.is_type_conversion());
    }
}

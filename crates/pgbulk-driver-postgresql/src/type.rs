use pgbulk_core::stmt;
use postgres_types::Type;

pub trait TypeExt {
    /// Converts a pgbulk type to a PostgreSQL type.
    fn to_postgres_type(&self) -> Type;
}

impl TypeExt for stmt::Type {
    fn to_postgres_type(&self) -> Type {
        match self {
            stmt::Type::Bool => Type::BOOL,
            stmt::Type::I16 => Type::INT2,
            stmt::Type::I32 | stmt::Type::Enum => Type::INT4,
            stmt::Type::I64 => Type::INT8,
            stmt::Type::F32 => Type::FLOAT4,
            stmt::Type::F64 => Type::FLOAT8,
            stmt::Type::Decimal => Type::NUMERIC,
            stmt::Type::String => Type::TEXT,
            stmt::Type::Bytes => Type::BYTEA,
            stmt::Type::Uuid => Type::UUID,
            stmt::Type::Date => Type::DATE,
            stmt::Type::Time => Type::TIME,
            stmt::Type::Timestamp => Type::TIMESTAMP,
            stmt::Type::TimestampTz => Type::TIMESTAMPTZ,
        }
    }
}

/// Resolves a column's declared SQL type, e.g. `varchar(50)` or
/// `timestamp with time zone`.
///
/// Returns `None` for types the driver does not know by name; the caller falls
/// back to the host type.
pub fn postgres_type_from_sql(sql_type: &str) -> Option<Type> {
    let normalized = sql_type.trim().to_ascii_lowercase();
    let base = normalized
        .split_once('(')
        .map(|(base, _)| base.trim_end())
        .unwrap_or(&normalized);

    Some(match base {
        "bool" | "boolean" => Type::BOOL,
        "int2" | "smallint" => Type::INT2,
        "int" | "int4" | "integer" => Type::INT4,
        "int8" | "bigint" => Type::INT8,
        "float4" | "real" => Type::FLOAT4,
        "float8" | "double precision" => Type::FLOAT8,
        "numeric" | "decimal" => Type::NUMERIC,
        "text" => Type::TEXT,
        "varchar" | "character varying" => Type::VARCHAR,
        "char" | "character" | "bpchar" => Type::BPCHAR,
        "name" => Type::NAME,
        "bytea" => Type::BYTEA,
        "uuid" => Type::UUID,
        "json" => Type::JSON,
        "jsonb" => Type::JSONB,
        "date" => Type::DATE,
        "time" | "time without time zone" => Type::TIME,
        "timestamp" | "timestamp without time zone" => Type::TIMESTAMP,
        "timestamptz" | "timestamp with time zone" => Type::TIMESTAMPTZ,
        _ => return None,
    })
}

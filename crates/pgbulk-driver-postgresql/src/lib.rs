mod r#type;
pub use r#type::{postgres_type_from_sql, TypeExt};

mod value;
pub(crate) use value::Value;

use pgbulk_core::{
    async_trait,
    driver::{CopyColumn, CopyRows, Rows},
    stmt::{self, ValueRecord},
    Error, Executor, Result,
};
use postgres_types::{ToSql, Type};
use rust_decimal::Decimal;
use tokio::sync::OnceCell;
use tokio_postgres::{
    binary_copy::BinaryCopyInWriter,
    tls::{MakeTlsConnect, TlsConnect},
    Client, Column, Config, GenericClient, NoTls, Row, Socket, Transaction,
};
use url::Url;

/// A PostgreSQL connection that opens itself on first use.
#[derive(Debug)]
pub struct PostgreSQL {
    /// The PostgreSQL client, once connected.
    client: OnceCell<Client>,

    /// How to connect, when constructed without a client.
    config: Option<Config>,
}

/// Runs statements on a caller-owned client or transaction.
///
/// Statements issued through a session borrowed from a [`Transaction`] run
/// inside that transaction; committing it stays with the caller.
#[derive(Debug, Clone, Copy)]
pub struct Session<'a> {
    client: &'a Client,
}

impl PostgreSQL {
    /// Initialize a pgbulk PostgreSQL driver using an initialized connection.
    pub fn new(connection: Client) -> Self {
        Self {
            client: OnceCell::new_with(Some(connection)),
            config: None,
        }
    }

    /// Creates a driver that connects on first use.
    ///
    /// The URL is validated immediately; no connection is made until a
    /// statement runs or [`Executor::ensure_open`] is called.
    pub fn lazy(url: &str) -> Result<Self> {
        Ok(Self {
            client: OnceCell::new(),
            config: Some(config_from_url(url)?),
        })
    }

    /// Connects to a PostgreSQL database using a connection string.
    ///
    /// See [`tokio_postgres::Config`] for more information.
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_config(config_from_url(url)?, NoTls).await
    }

    /// Connects to a PostgreSQL database using a [`tokio_postgres::Config`].
    pub async fn connect_with_config<T>(config: Config, tls: T) -> Result<Self>
    where
        T: MakeTlsConnect<Socket> + 'static,
        T::Stream: Send,
        <T::TlsConnect as TlsConnect<Socket>>::Future: Send,
    {
        let client = spawn_connection(&config, tls).await?;
        Ok(Self::new(client))
    }

    /// Returns the session for this connection, connecting if needed.
    pub async fn session(&self) -> Result<Session<'_>> {
        let client = self
            .client
            .get_or_try_init(|| async {
                let config = self.config.as_ref().ok_or_else(|| {
                    Error::configuration("driver has neither a client nor a connection config")
                })?;
                spawn_connection(config, NoTls).await
            })
            .await?;

        Ok(Session { client })
    }
}

impl<'a> Session<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }
}

impl<'a> From<&'a Client> for Session<'a> {
    fn from(client: &'a Client) -> Self {
        Self::new(client)
    }
}

impl<'a> From<&'a Transaction<'_>> for Session<'a> {
    fn from(transaction: &'a Transaction<'_>) -> Self {
        Self::new(GenericClient::client(transaction))
    }
}

/// Parses a `postgresql://` URL into a connection config.
pub fn config_from_url(url: &str) -> Result<Config> {
    let url = Url::parse(url).map_err(|err| {
        Error::configuration(format!("invalid connection URL: {err}"))
    })?;

    if url.scheme() != "postgresql" && url.scheme() != "postgres" {
        return Err(Error::configuration(format!(
            "connection URL does not have a `postgresql` scheme; url={url}"
        )));
    }

    let host = url.host_str().ok_or_else(|| {
        Error::configuration(format!("missing host in connection URL; url={url}"))
    })?;

    if url.path().trim_start_matches('/').is_empty() {
        return Err(Error::configuration(format!(
            "no database specified - missing path in connection URL; url={url}"
        )));
    }

    let mut config = Config::new();
    config.host(host);
    config.dbname(url.path().trim_start_matches('/'));

    if let Some(port) = url.port() {
        config.port(port);
    }

    if !url.username().is_empty() {
        config.user(url.username());
    }

    if let Some(password) = url.password() {
        config.password(password);
    }

    Ok(config)
}

async fn spawn_connection<T>(config: &Config, tls: T) -> Result<Client>
where
    T: MakeTlsConnect<Socket> + 'static,
    T::Stream: Send,
    <T::TlsConnect as TlsConnect<Socket>>::Future: Send,
{
    let (client, connection) = config.connect(tls).await.map_err(Error::driver)?;

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            log::error!("connection error: {e}");
        }
    });

    Ok(client)
}

#[async_trait]
impl Executor for PostgreSQL {
    async fn ensure_open(&self) -> Result<()> {
        self.session().await.map(|_| ())
    }

    async fn execute(&self, sql: &str, params: &[stmt::Value]) -> Result<u64> {
        self.session().await?.execute(sql, params).await
    }

    async fn query(&self, sql: &str, params: &[stmt::Value]) -> Result<Rows> {
        self.session().await?.query(sql, params).await
    }

    async fn copy_in(
        &self,
        sql: &str,
        columns: &[CopyColumn],
        rows: &mut CopyRows<'_>,
    ) -> Result<u64> {
        self.session().await?.copy_in(sql, columns, rows).await
    }
}

#[async_trait]
impl Executor for Session<'_> {
    async fn execute(&self, sql: &str, params: &[stmt::Value]) -> Result<u64> {
        let params = params.iter().cloned().map(Value::from).collect::<Vec<_>>();
        let args = params
            .iter()
            .map(|param| param as &(dyn ToSql + Sync))
            .collect::<Vec<_>>();

        log::trace!("execute; sql={sql}; params={}", params.len());
        self.client.execute(sql, &args).await.map_err(Error::driver)
    }

    async fn query(&self, sql: &str, params: &[stmt::Value]) -> Result<Rows> {
        let params = params.iter().cloned().map(Value::from).collect::<Vec<_>>();
        let args = params
            .iter()
            .map(|param| param as &(dyn ToSql + Sync))
            .collect::<Vec<_>>();

        log::trace!("query; sql={sql}; params={}", params.len());
        let rows = self.client.query(sql, &args).await.map_err(Error::driver)?;

        let Some(first) = rows.first() else {
            return Ok(Rows::default());
        };

        let columns = first
            .columns()
            .iter()
            .map(|column| column.name().to_string())
            .collect();

        let records = rows
            .iter()
            .map(|row| {
                row.columns()
                    .iter()
                    .enumerate()
                    .map(|(index, column)| postgres_to_pgbulk(index, row, column))
                    .collect::<Result<Vec<_>>>()
                    .map(ValueRecord::from_vec)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Rows::new(columns, records))
    }

    async fn copy_in(
        &self,
        sql: &str,
        columns: &[CopyColumn],
        rows: &mut CopyRows<'_>,
    ) -> Result<u64> {
        let types = columns
            .iter()
            .map(|column| {
                postgres_type_from_sql(&column.sql_type)
                    .unwrap_or_else(|| column.ty.to_postgres_type())
            })
            .collect::<Vec<_>>();

        let sink = self.client.copy_in(sql).await.map_err(Error::driver)?;
        let writer = BinaryCopyInWriter::new(sink, &types);
        tokio::pin!(writer);

        for row in rows {
            let values = row?.into_iter().map(Value::from).collect::<Vec<_>>();
            if values.len() != types.len() {
                return Err(Error::invalid_result(format!(
                    "copy row has {} values for {} columns",
                    values.len(),
                    types.len()
                )));
            }

            let args = values
                .iter()
                .map(|value| value as &(dyn ToSql + Sync))
                .collect::<Vec<_>>();

            writer
                .as_mut()
                .write(&args)
                .await
                .map_err(Error::driver)?;
        }

        writer.finish().await.map_err(Error::driver)
    }
}

fn postgres_to_pgbulk(index: usize, row: &Row, column: &Column) -> Result<stmt::Value> {
    fn get<'a, T>(row: &'a Row, index: usize) -> Result<Option<T>>
    where
        T: tokio_postgres::types::FromSql<'a>,
    {
        row.try_get::<usize, Option<T>>(index)
            .map_err(Error::driver)
    }

    let ty = column.type_();

    // NOTE: the inner representation of the PostgreSQL type enum is not
    // accessible, so each type is matched by hand.
    let value = if ty == &Type::BOOL {
        get::<bool>(row, index)?.map(stmt::Value::Bool)
    } else if ty == &Type::INT2 {
        get::<i16>(row, index)?.map(stmt::Value::I16)
    } else if ty == &Type::INT4 {
        get::<i32>(row, index)?.map(stmt::Value::I32)
    } else if ty == &Type::INT8 {
        get::<i64>(row, index)?.map(stmt::Value::I64)
    } else if ty == &Type::FLOAT4 {
        get::<f32>(row, index)?.map(stmt::Value::F32)
    } else if ty == &Type::FLOAT8 {
        get::<f64>(row, index)?.map(stmt::Value::F64)
    } else if ty == &Type::NUMERIC {
        get::<Decimal>(row, index)?.map(stmt::Value::Decimal)
    } else if ty == &Type::TEXT
        || ty == &Type::VARCHAR
        || ty == &Type::BPCHAR
        || ty == &Type::NAME
    {
        get::<String>(row, index)?.map(stmt::Value::String)
    } else if ty == &Type::BYTEA {
        get::<Vec<u8>>(row, index)?.map(stmt::Value::Bytes)
    } else if ty == &Type::UUID {
        get::<uuid::Uuid>(row, index)?.map(stmt::Value::Uuid)
    } else if ty == &Type::DATE {
        get::<chrono::NaiveDate>(row, index)?.map(stmt::Value::Date)
    } else if ty == &Type::TIME {
        get::<chrono::NaiveTime>(row, index)?.map(stmt::Value::Time)
    } else if ty == &Type::TIMESTAMP {
        get::<chrono::NaiveDateTime>(row, index)?.map(stmt::Value::Timestamp)
    } else if ty == &Type::TIMESTAMPTZ {
        get::<chrono::DateTime<chrono::Utc>>(row, index)?.map(stmt::Value::TimestampTz)
    } else {
        return Err(Error::invalid_result(format!(
            "unsupported PostgreSQL type `{ty}` in column `{}`",
            column.name()
        )));
    };

    Ok(value.unwrap_or(stmt::Value::Null))
}

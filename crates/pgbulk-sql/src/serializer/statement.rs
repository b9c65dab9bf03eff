use super::{assignments::ColumnList, expr::Returning, Comma, Params, ToSql};

use crate::stmt::{self, InsertSource, MergeSource, Statement};

impl ToSql for &Statement {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        match self {
            Statement::CopyIn(stmt) => stmt.to_sql(f),
            Statement::CreateTable(stmt) => stmt.to_sql(f),
            Statement::Delete(stmt) => stmt.to_sql(f),
            Statement::Insert(stmt) => stmt.to_sql(f),
            Statement::Merge(stmt) => stmt.to_sql(f),
            Statement::Select(stmt) => stmt.to_sql(f),
            Statement::Update(stmt) => stmt.to_sql(f),
        }
    }
}

impl ToSql for &stmt::CopyIn {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        let table = &self.table;
        let columns = ColumnList(&self.columns);

        fmt!(f, "COPY " table " " columns " FROM STDIN (FORMAT BINARY)");
    }
}

impl ToSql for &stmt::CreateTable {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        let temporary = if self.temporary { "TEMP " } else { "" };
        let name = &self.name;
        let columns = Comma(&self.columns);

        fmt!(f, "CREATE " temporary "TABLE " name " (" columns ")");
    }
}

impl ToSql for &stmt::Delete {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        let target = &self.target;
        let filter = &self.filter;

        fmt!(f, "DELETE FROM " target);

        if let Some(using) = &self.using {
            fmt!(f, " USING " using);
        }

        fmt!(f, " WHERE " filter);
    }
}

impl ToSql for &stmt::Insert {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        let target = &self.target;
        let columns = ColumnList(&self.columns);

        fmt!(f, "INSERT INTO " target " " columns " ");

        match &self.source {
            InsertSource::Select(select) => fmt!(f, &**select),
            InsertSource::Values(values) => fmt!(f, "VALUES (" Comma(values) ")"),
        }

        fmt!(f, Returning(&self.returning));
    }
}

impl ToSql for &stmt::Merge {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        let target = &self.target;
        let on = &self.on;

        fmt!(f, "MERGE INTO " target " USING ");

        match &self.source {
            MergeSource::Table(table) => fmt!(f, table),
            MergeSource::Query(select, alias) => {
                let select = &**select;
                fmt!(f, "(" select ") AS " alias)
            }
        }

        fmt!(f, " ON " on);

        if let Some(assignments) = &self.when_matched {
            fmt!(f, " WHEN MATCHED THEN UPDATE SET " assignments);
        }

        if let Some(insert) = &self.when_not_matched {
            let columns = ColumnList(&insert.columns);
            let values = Comma(&insert.values);

            fmt!(f, " WHEN NOT MATCHED THEN INSERT " columns " VALUES (" values ")");
        }

        if let Some(action) = &self.when_not_matched_by_source {
            fmt!(f, " WHEN NOT MATCHED BY SOURCE THEN " action);
        }

        fmt!(f, Returning(&self.returning));
    }
}

impl ToSql for &stmt::Select {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        fmt!(f, "SELECT " Comma(&self.items));

        if let Some(from) = &self.from {
            fmt!(f, " FROM " from);
        }

        for join in &self.joins {
            let table = &join.table;
            let on = &join.on;
            fmt!(f, " JOIN " table " ON " on);
        }

        if let Some(order_by) = &self.order_by {
            fmt!(f, " ORDER BY " order_by);
        }
    }
}

impl ToSql for &stmt::Update {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        let target = &self.target;
        let assignments = &self.assignments;
        let filter = &self.filter;

        fmt!(f, "UPDATE " target " SET " assignments);

        if let Some(from) = &self.from {
            fmt!(f, " FROM " from);
        }

        fmt!(f, " WHERE " filter Returning(&self.returning));
    }
}

use crate::IndexingUrl;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

pub struct TableBuilder {
    rows: Vec<TableRow>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn add_row(&mut self, label: &str, value: &str) {
        self.rows.push(TableRow {
            metric: label.to_string(),
            value: value.to_string(),
        });
    }

    pub fn build(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }

        Table::new(&self.rows).with(Style::rounded()).to_string()
    }
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn stats_table(stats: &[(&str, &str)]) -> String {
    let mut builder = TableBuilder::new();
    for (label, value) in stats {
        builder.add_row(label, value);
    }
    builder.build()
}

/// One tracked URL, rendered for the detailed listing
#[derive(Tabled)]
struct UrlRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "URL")]
    url: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Created")]
    created: String,
    #[tabled(rename = "Updated")]
    updated: String,
}

impl From<&IndexingUrl> for UrlRow {
    fn from(row: &IndexingUrl) -> Self {
        let missing = || "-".to_string();
        let stamp = |t: Option<chrono::NaiveDateTime>| {
            t.map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(missing)
        };
        Self {
            id: row.id,
            url: row.url.clone().unwrap_or_else(missing),
            status: row.status.clone().unwrap_or_else(missing),
            created: stamp(row.created),
            updated: stamp(row.updated),
        }
    }
}

/// Every row as a table; empty string when there are none
pub fn url_table(rows: &[IndexingUrl]) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let rows: Vec<UrlRow> = rows.iter().map(UrlRow::from).collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

// This file is part of the product Flashdeck.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use rusqlite::types::Value;

#[derive(Debug)]
pub enum QueryError {
    InvalidParameter(String),
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryError::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
        }
    }
}

impl std::error::Error for QueryError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Question,
    Category,
    Views,
    UploadDate,
}

impl SortField {
    /// Parses the `sort` request parameter. Unknown fields are rejected up
    /// front instead of surfacing as a failed column lookup later.
    pub fn parse(raw: Option<&str>) -> Result<Self, QueryError> {
        match raw {
            None | Some("") | Some("upload_date") => Ok(SortField::UploadDate),
            Some("question") => Ok(SortField::Question),
            Some("category") => Ok(SortField::Category),
            Some("views") => Ok(SortField::Views),
            Some(other) => Err(QueryError::InvalidParameter(format!(
                "unknown sort field '{}'",
                other
            ))),
        }
    }

    fn column(self) -> &'static str {
        match self {
            SortField::Question => "c.question",
            // order_by('category') in the original sorts by the foreign key,
            // not the category name
            SortField::Category => "c.category_id",
            SortField::Views => "c.views",
            SortField::UploadDate => "c.upload_date",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// Anything other than "asc" means descending, including absent and
    /// unrecognized values. Clients have depended on this permissiveness.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }

    fn keyword(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// 1-based page selection with a fixed page size.
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub number: u32,
    pub size: u32,
}

impl Page {
    pub fn parse(raw: Option<&str>, size: u32) -> Result<Self, QueryError> {
        let number = match raw {
            None | Some("") => 1,
            Some(value) => value.parse::<u32>().map_err(|_| {
                QueryError::InvalidParameter(format!("malformed page number '{}'", value))
            })?,
        };
        if number == 0 {
            return Err(QueryError::InvalidParameter(
                "page numbers start at 1".to_string(),
            ));
        }
        Ok(Page { number, size })
    }

    /// Row offset of this page. Widened to u64: the largest parseable page
    /// number times any page size must not overflow.
    pub fn offset(&self) -> u64 {
        u64::from(self.number - 1) * u64::from(self.size)
    }
}

/// Strongly-typed filter/sort configuration for the catalog listing.
///
/// One builder covers the catalog, tag, and personal listings; the tag and
/// author restrictions are optional predicates layered onto the same plan.
#[derive(Debug, Clone)]
pub struct CatalogQuery {
    pub search: Option<String>,
    pub sort: SortField,
    pub order: SortOrder,
    pub tag: Option<i64>,
    pub author: Option<i64>,
}

impl Default for CatalogQuery {
    fn default() -> Self {
        Self {
            search: None,
            sort: SortField::UploadDate,
            order: SortOrder::Desc,
            tag: None,
            author: None,
        }
    }
}

impl CatalogQuery {
    pub fn from_params(
        sort: Option<&str>,
        order: Option<&str>,
        search: Option<&str>,
    ) -> Result<Self, QueryError> {
        Ok(Self {
            // An empty search string is the same as no search string
            search: search
                .map(str::to_string)
                .filter(|value| !value.is_empty()),
            sort: SortField::parse(sort)?,
            order: SortOrder::parse(order),
            ..Self::default()
        })
    }

    pub fn with_tag(mut self, tag_id: i64) -> Self {
        self.tag = Some(tag_id);
        self
    }

    pub fn with_author(mut self, author_id: i64) -> Self {
        self.author = Some(author_id);
        self
    }

    /// Produces the SELECT and COUNT statements for this query.
    ///
    /// A card can match a search term through several of its tags, so the
    /// row set is deduplicated by card id before pagination.
    pub fn plan(&self, page: Page) -> QueryPlan {
        let mut joins = String::new();
        let mut conditions: Vec<&'static str> = Vec::new();
        let mut params: Vec<Value> = Vec::new();

        if let Some(tag_id) = self.tag {
            joins.push_str(" JOIN card_tags ft ON ft.card_id = c.id AND ft.tag_id = ?");
            params.push(Value::Integer(tag_id));
        }
        if let Some(query) = self.search.as_deref() {
            joins.push_str(
                " LEFT JOIN card_tags st ON st.card_id = c.id \
                 LEFT JOIN tags t ON t.id = st.tag_id",
            );
            conditions.push(
                "(c.question LIKE ? ESCAPE '\\' \
                 OR c.answer LIKE ? ESCAPE '\\' \
                 OR t.name LIKE ? ESCAPE '\\')",
            );
            let pattern = contains_pattern(query);
            params.push(Value::Text(pattern.clone()));
            params.push(Value::Text(pattern.clone()));
            params.push(Value::Text(pattern));
        }
        if let Some(author_id) = self.author {
            conditions.push("c.author_id = ?");
            params.push(Value::Integer(author_id));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        // Secondary sort on id keeps pagination deterministic on ties.
        let select_sql = format!(
            "SELECT DISTINCT c.id, c.question, c.answer, c.category_id, cat.name, \
             c.upload_date, c.views, c.favorites, c.check_status, c.author_id \
             FROM cards c JOIN categories cat ON cat.id = c.category_id{joins}{where_clause} \
             ORDER BY {column} {order}, c.id ASC LIMIT ? OFFSET ?",
            joins = joins,
            where_clause = where_clause,
            column = self.sort.column(),
            order = self.order.keyword(),
        );
        let count_sql = format!(
            "SELECT COUNT(DISTINCT c.id) FROM cards c \
             JOIN categories cat ON cat.id = c.category_id{joins}{where_clause}",
            joins = joins,
            where_clause = where_clause,
        );

        let mut select_params = params.clone();
        select_params.push(Value::Integer(i64::from(page.size)));
        // An offset past i64::MAX is equally past the end of any table.
        select_params.push(Value::Integer(
            i64::try_from(page.offset()).unwrap_or(i64::MAX),
        ));

        QueryPlan {
            select_sql,
            select_params,
            count_sql,
            count_params: params,
        }
    }
}

#[derive(Debug)]
pub struct QueryPlan {
    pub select_sql: String,
    pub select_params: Vec<Value>,
    pub count_sql: String,
    pub count_params: Vec<Value>,
}

/// Builds a case-insensitive `%...%` pattern, escaping LIKE wildcards in the
/// user's input.
fn contains_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    for ch in query.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    format!("%{}%", escaped)
}

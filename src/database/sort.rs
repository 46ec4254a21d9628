//! Sort allow-lists for the admin listings.
//!
//! Sort fields arrive as free-form query parameters; anything not on the
//! allow-list silently falls back to the default column, and anything that is
//! not `asc`/`desc` falls back to ascending. Returning `&'static str` keeps
//! user input out of the ORDER BY clause entirely.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn to_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }

    pub fn parse(raw: Option<&str>) -> SortOrder {
        match raw {
            Some(s) if s.eq_ignore_ascii_case("desc") => SortOrder::Desc,
            _ => SortOrder::Asc,
        }
    }
}

/// Sortable fields of the users listing; unknown fields fall back to fullName.
pub fn user_sort_column(raw: Option<&str>) -> &'static str {
    match raw.unwrap_or("fullName") {
        "fullName" => "u.full_name",
        "email" => "u.email",
        "address" => "u.address",
        "role" => "u.role",
        "created_at" => "u.created_at",
        "average_rating" => "average_rating",
        _ => "u.full_name",
    }
}

/// Sortable fields of the stores listing; unknown fields fall back to name.
pub fn store_sort_column(raw: Option<&str>) -> &'static str {
    match raw.unwrap_or("name") {
        "name" => "s.store_name",
        "email" => "s.email",
        "address" => "s.address",
        "created_at" => "s.created_at",
        "average_rating" => "average_rating",
        "total_ratings" => "total_ratings",
        _ => "s.store_name",
    }
}

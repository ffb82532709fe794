//! Identifier casing for catalog names
//!
//! Catalog identifiers are snake or kebab separated. Type and field names use a
//! Capitalized compound form (`user_id` → `UserId`), parameter names a
//! lower-camel form (`userId`). Rust-facing identifiers additionally go through
//! `heck` snake casing and raw-identifier escaping.

use heck::ToSnakeCase;

/// `order_item-id` → `OrderItemId`.
///
/// Each segment is lowercased before capitalizing, so `HTTP_status` becomes
/// `HttpStatus`. The `id` segment is always `Id`, never `ID`.
pub fn to_camel(name: &str) -> String {
    name.split(['_', '-'])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let lower = part.to_lowercase();
            if lower == "id" {
                return "Id".to_string();
            }
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect()
}

/// `order_item_id` → `orderItemId`.
pub fn to_lower_camel(name: &str) -> String {
    lower_first(&to_camel(name))
}

fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Snake-cased Rust identifier, escaped when it collides with a keyword.
///
/// Names with no alphanumeric characters become `column`.
pub fn rust_ident(name: &str) -> String {
    let snake = name.to_snake_case();
    if snake.is_empty() {
        return "column".to_string();
    }
    if matches!(snake.as_str(), "self" | "super" | "crate") {
        return format!("{snake}_");
    }
    if is_keyword(&snake) {
        return format!("r#{snake}");
    }
    if snake.starts_with(|c: char| c.is_ascii_digit()) {
        return format!("_{snake}");
    }
    snake
}

/// Upper snake case constant name (`created_at` → `CREATED_AT`).
pub fn const_ident(name: &str) -> String {
    let upper = name.to_snake_case().to_uppercase();
    if upper.is_empty() {
        return "COLUMN".to_string();
    }
    if upper.starts_with(|c: char| c.is_ascii_digit()) {
        return format!("_{upper}");
    }
    upper
}

/// Base name shared by the per-table output files; always a valid module name.
pub fn file_base(table: &str) -> String {
    let snake = table.to_snake_case();
    if snake.is_empty() || snake.starts_with(|c: char| c.is_ascii_digit()) {
        format!("table_{snake}")
    } else {
        snake
    }
}

fn is_keyword(s: &str) -> bool {
    matches!(
        s,
        "as" | "async"
            | "await"
            | "break"
            | "const"
            | "continue"
            | "dyn"
            | "else"
            | "enum"
            | "extern"
            | "false"
            | "fn"
            | "for"
            | "gen"
            | "if"
            | "impl"
            | "in"
            | "let"
            | "loop"
            | "match"
            | "mod"
            | "move"
            | "mut"
            | "pub"
            | "ref"
            | "return"
            | "static"
            | "struct"
            | "trait"
            | "true"
            | "type"
            | "unsafe"
            | "use"
            | "where"
            | "while"
            | "abstract"
            | "become"
            | "box"
            | "do"
            | "final"
            | "macro"
            | "override"
            | "priv"
            | "try"
            | "typeof"
            | "unsized"
            | "virtual"
            | "yield"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_camel() {
        assert_eq!(to_camel("users"), "Users");
        assert_eq!(to_camel("order_items"), "OrderItems");
        assert_eq!(to_camel("user-profile"), "UserProfile");
        assert_eq!(to_camel("user_id"), "UserId");
        assert_eq!(to_camel("ID"), "Id");
        assert_eq!(to_camel("HTTP_status"), "HttpStatus");
        assert_eq!(to_camel("__weird__name_"), "WeirdName");
        assert_eq!(to_camel(""), "");
    }

    #[test]
    fn test_to_lower_camel() {
        assert_eq!(to_lower_camel("user_id"), "userId");
        assert_eq!(to_lower_camel("id"), "id");
        assert_eq!(to_lower_camel("tenant_id_hash"), "tenantIdHash");
    }

    #[test]
    fn test_rust_ident() {
        assert_eq!(rust_ident("createdAt"), "created_at");
        assert_eq!(rust_ident("email"), "email");
        assert_eq!(rust_ident("type"), "r#type");
        assert_eq!(rust_ident("self"), "self_");
        assert!(rust_ident("2fa_secret").starts_with('_'));
        assert_eq!(rust_ident("$$"), "column");
    }

    #[test]
    fn test_const_ident() {
        assert_eq!(const_ident("created_at"), "CREATED_AT");
        assert_eq!(const_ident("userId"), "USER_ID");
        assert_eq!(const_ident("--"), "COLUMN");
    }

    #[test]
    fn test_file_base() {
        assert_eq!(file_base("users"), "users");
        assert_eq!(file_base("order-items"), "order_items");
        assert_eq!(file_base("OrderItems"), "order_items");
        assert!(file_base("2024_events").starts_with("table_"));
    }
}

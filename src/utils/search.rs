use sea_orm::sea_query::LikeExpr;

const ESCAPE: char = '\\';

/// `LIKE` pattern matching `text` anywhere, with its own `%`, `_` and `\`
/// taken literally.
pub fn contains_pattern(text: &str) -> LikeExpr {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | ESCAPE) {
            pattern.push(ESCAPE);
        }
        pattern.push(c);
    }
    pattern.push('%');

    LikeExpr::new(pattern).escape(ESCAPE)
}

use crate::game::{Difficulty, StoneColor};
use crate::palette::{palette_hint, CatalogColor};

/// Generic numeric input validation
pub fn validate_numeric_input<T>(
    input: &str,
    min: Option<T>,
    max: Option<T>,
    field_name: &str,
) -> Result<T, String>
where
    T: std::str::FromStr + std::fmt::Display + PartialOrd,
{
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(format!("{} cannot be empty", field_name));
    }

    match trimmed.parse::<T>() {
        Ok(val) => {
            if let Some(min_val) = min {
                if val < min_val {
                    return Err(format!("{} must be at least {}", field_name, min_val));
                }
            }
            if let Some(max_val) = max {
                if val > max_val {
                    return Err(format!("{} cannot exceed {}", field_name, max_val));
                }
            }
            Ok(val)
        }
        Err(_) => Err(format!("{} must be a valid number", field_name)),
    }
}

/// Validate the difficulty select value (number of stones)
pub fn parse_difficulty(input: &str) -> Result<Difficulty, String> {
    let stones = validate_numeric_input(input, Some(4usize), Some(5usize), "Difficulty")?;
    Difficulty::from_stones(stones).ok_or_else(|| format!("Unsupported difficulty {}", stones))
}

/// A stone select's value: empty means nothing chosen yet.
pub fn parse_stone_selection(value: &str) -> Result<Option<StoneColor>, String> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    StoneColor::from_name(value)
        .map(Some)
        .ok_or_else(|| format!("Unknown stone colour '{}'", value))
}

/// Check a guess before it is sent: exactly `stones` stones, all chosen.
pub fn validate_guess(
    selection: &[Option<StoneColor>],
    stones: usize,
) -> Result<Vec<StoneColor>, String> {
    let chosen: Vec<StoneColor> = selection.iter().take(stones).flatten().copied().collect();
    if chosen.len() != stones {
        return Err(format!(
            "Choose all {} stones before guessing ({} chosen)",
            stones,
            chosen.len()
        ));
    }
    Ok(chosen)
}

/// Form fields of a guess submission, in stone order.
pub fn guess_fields(guess: &[StoneColor]) -> Vec<(&'static str, String)> {
    guess
        .iter()
        .map(|stone| ("guess", stone.name().to_string()))
        .collect()
}

/// Parse a colour typed into the recolour prompt.
pub fn parse_catalog_color(input: &str) -> Result<CatalogColor, String> {
    if input.trim().is_empty() {
        return Err("Colour cannot be empty".to_string());
    }
    CatalogColor::from_name(input).ok_or_else(|| {
        format!(
            "Unknown colour '{}'. Choose one of: {}",
            input.trim(),
            palette_hint()
        )
    })
}

/// Append a cache-busting token so a regenerated image is fetched again.
pub fn cache_busted(url: &str, token: u64) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{}{}t={}", url, separator, token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_input_bounds() {
        assert_eq!(validate_numeric_input("7", Some(1u32), Some(10), "N"), Ok(7));
        assert_eq!(
            validate_numeric_input::<u32>("  ", None, None, "N"),
            Err("N cannot be empty".to_string())
        );
        assert_eq!(
            validate_numeric_input("0", Some(1u32), None, "N"),
            Err("N must be at least 1".to_string())
        );
        assert!(validate_numeric_input::<u32>("x", None, None, "N").is_err());
    }

    #[test]
    fn difficulty_accepts_four_and_five() {
        assert_eq!(parse_difficulty("4"), Ok(Difficulty::Four));
        assert_eq!(parse_difficulty(" 5 "), Ok(Difficulty::Five));
        assert_eq!(
            parse_difficulty("6"),
            Err("Difficulty cannot exceed 5".to_string())
        );
    }

    #[test]
    fn stone_selection_parsing() {
        assert_eq!(parse_stone_selection(""), Ok(None));
        assert_eq!(parse_stone_selection("modrá"), Ok(Some(StoneColor::Blue)));
        assert!(parse_stone_selection("blue").is_err());
    }

    #[test]
    fn guess_must_have_exact_length() {
        let partial = [Some(StoneColor::Red), None, Some(StoneColor::Blue), Some(StoneColor::Cyan)];
        assert!(validate_guess(&partial, 4).is_err());

        let full = [
            Some(StoneColor::Red),
            Some(StoneColor::Blue),
            Some(StoneColor::Green),
            Some(StoneColor::Yellow),
            Some(StoneColor::Purple),
        ];
        let guess = validate_guess(&full, 4).unwrap();
        assert_eq!(guess.len(), 4);
        assert!(validate_guess(&full[..3], 4).is_err());
        assert_eq!(validate_guess(&full, 5).unwrap().len(), 5);
    }

    #[test]
    fn guess_fields_keep_order() {
        let fields = guess_fields(&[StoneColor::Yellow, StoneColor::Red]);
        assert_eq!(
            fields,
            vec![("guess", "žlutá".to_string()), ("guess", "červená".to_string())]
        );
    }

    #[test]
    fn catalog_color_prompt_input() {
        assert_eq!(parse_catalog_color(" Navy"), Ok(CatalogColor::Navy));
        let err = parse_catalog_color("crimson").unwrap_err();
        assert!(err.contains("crimson"));
        assert!(err.contains("maroon"));
        assert!(parse_catalog_color("").is_err());
    }

    #[test]
    fn cache_busting_appends_token() {
        assert_eq!(cache_busted("/outputs/replica.png", 42), "/outputs/replica.png?t=42");
        assert_eq!(cache_busted("/r.png?v=1", 7), "/r.png?v=1&t=7");
    }
}

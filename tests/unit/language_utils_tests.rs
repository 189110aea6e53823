/*!
 * Tests for language utility functions
 */

use smartsub::language_utils::{display_language, get_language_name, normalize_to_part2t};

#[test]
fn test_normalize_to_part2t_withValidCodes_shouldNormalizeCorrectly() {
    assert_eq!(normalize_to_part2t("en").unwrap(), "eng");
    assert_eq!(normalize_to_part2t("fr").unwrap(), "fra");
    assert_eq!(normalize_to_part2t("fra").unwrap(), "fra");
    assert_eq!(normalize_to_part2t("fre").unwrap(), "fra");
    assert_eq!(normalize_to_part2t("ger").unwrap(), "deu");

    // Case insensitivity and whitespace
    assert_eq!(normalize_to_part2t("EN").unwrap(), "eng");
    assert_eq!(normalize_to_part2t(" fre ").unwrap(), "fra");
}

#[test]
fn test_normalize_to_part2t_withInvalidCodes_shouldFail() {
    assert!(normalize_to_part2t("e").is_err());
    assert!(normalize_to_part2t("123").is_err());
    assert!(normalize_to_part2t("Chinese").is_err());
}

#[test]
fn test_get_language_name_withCodes_shouldReturnEnglishName() {
    assert_eq!(get_language_name("en").unwrap(), "English");
    assert_eq!(get_language_name("fr").unwrap(), "French");
    assert_eq!(get_language_name("deu").unwrap(), "German");
}

#[test]
fn test_display_language_withFreeFormName_shouldPassThrough() {
    assert_eq!(display_language("fr"), "French");
    assert_eq!(display_language("  Brazilian Portuguese "), "Brazilian Portuguese");
    // Test fixtures use single-letter targets; they must survive unchanged
    assert_eq!(display_language("X"), "X");
}

/*!
 * Tests for language utilities
 */

use livestock_client::language_utils::{
    SUPPORTED_LANGUAGES, get_language_name, is_supported, normalize_language_code, validate_language_code,
};

#[test]
fn test_supported_languages_should_all_validate() {
    for (code, name) in SUPPORTED_LANGUAGES {
        assert!(validate_language_code(code).is_ok(), "{} should be valid", code);
        assert_eq!(get_language_name(code), name);
    }
}

#[test]
fn test_validate_language_code_with_three_letter_code_should_succeed() {
    assert!(validate_language_code("eng").is_ok());
    assert!(validate_language_code("HIN").is_ok());
}

#[test]
fn test_validate_language_code_with_garbage_should_fail() {
    assert!(validate_language_code("").is_err());
    assert!(validate_language_code("english").is_err());
    assert!(validate_language_code("zz").is_err());
}

#[test]
fn test_get_language_name_with_unknown_code_should_return_code() {
    assert_eq!(get_language_name("fr"), "French");
    assert_eq!(get_language_name("zz"), "zz");
}

#[test]
fn test_is_supported_should_normalize() {
    assert!(is_supported(" TA "));
    assert!(!is_supported("fr"));
    assert_eq!(normalize_language_code(" Kn "), "kn");
}

use redeem_core::{parse_code_list, parse_cookie_text, CredentialSet};

#[test]
fn code_list_trims_and_skips_comments() {
    let raw = "  GIFT-AAA \n# promo batch two\n\nGIFT-BBB\n   \nGIFT-CCC";
    assert_eq!(parse_code_list(raw), vec!["GIFT-AAA", "GIFT-BBB", "GIFT-CCC"]);
}

#[test]
fn code_list_of_only_comments_is_empty() {
    assert!(parse_code_list("# one\n  # two\n").is_empty());
}

#[test]
fn cookie_line_splits_on_semicolons() {
    let credentials = parse_cookie_text("PHPSESSID=abc123; theme=dark");
    assert_eq!(credentials.len(), 2);
    assert_eq!(
        credentials.to_cookie_header().as_deref(),
        Some("PHPSESSID=abc123; theme=dark")
    );
}

#[test]
fn cookie_text_skips_comments_and_lines_without_pairs() {
    let raw = "# exported from browser\nno-equals-here\nsession=xyz\n";
    let credentials = parse_cookie_text(raw);
    assert_eq!(credentials.len(), 1);
    assert_eq!(credentials.to_cookie_header().as_deref(), Some("session=xyz"));
}

#[test]
fn repeated_cookie_name_keeps_last_value() {
    let credentials = parse_cookie_text("session=old\nsession=new");
    assert_eq!(credentials.len(), 1);
    assert_eq!(credentials.to_cookie_header().as_deref(), Some("session=new"));
}

#[test]
fn cookie_values_may_contain_equals() {
    let credentials = parse_cookie_text("token=a=b=c");
    assert_eq!(credentials.to_cookie_header().as_deref(), Some("token=a=b=c"));
}

#[test]
fn empty_credential_set_renders_no_header() {
    assert_eq!(CredentialSet::new().to_cookie_header(), None);
    assert!(parse_cookie_text("").is_empty());
}

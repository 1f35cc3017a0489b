use chub_derive::hub_error;
use std::borrow::Cow;

#[hub_error]
pub enum LookupError {
    #[error("Missing{}: {message}", format_context(.context))]
    Missing { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Parse failure{}: {source}", format_context(.context))]
    Parse { source: std::num::ParseIntError, context: Option<Cow<'static, str>> },
}

fn parse(raw: &str) -> Result<u32, LookupError> {
    raw.parse::<u32>().context("Parsing port")
}

fn find() -> Result<u32, LookupError> {
    Err(LookupError::Missing { message: "port".into(), context: None }).context("Reading settings")
}

fn main() {
    let err = parse("eighty").unwrap_err();
    assert!(err.to_string().starts_with("Parse failure (Parsing port): "));

    let err = find().unwrap_err();
    assert_eq!(err.to_string(), "Missing (Reading settings): port");
}

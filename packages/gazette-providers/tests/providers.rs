use reqwest::header::AUTHORIZATION;
use serde_json::Map;

#[test]
fn builds_bearer_auth_header() {
	let headers =
		gazette_providers::auth_headers("secret", &Map::new()).expect("Failed to build headers.");
	let value = headers.get(AUTHORIZATION).expect("Missing authorization header.");

	assert_eq!(value, "Bearer secret");
}

#[test]
fn carries_default_headers_through() {
	let mut defaults = Map::new();

	defaults.insert("x-example".to_string(), serde_json::Value::String("yes".to_string()));

	let headers =
		gazette_providers::auth_headers("secret", &defaults).expect("Failed to build headers.");

	assert_eq!(headers.get("x-example").expect("Missing default header."), "yes");
}

#[test]
fn rejects_non_string_default_headers() {
	let mut defaults = Map::new();

	defaults.insert("x-example".to_string(), serde_json::Value::Bool(true));

	assert!(gazette_providers::auth_headers("secret", &defaults).is_err());
}

use serde::{Deserialize, Deserializer};
use utoipa::OpenApi;

pub mod account;
pub mod todo;

pub use account::*;
pub use todo::*;

/// Collects the schemas of the view models so they appear in the OpenAPI document even when
/// no path references them directly
#[derive(OpenApi)]
#[openapi(components(schemas(
    account::SignupForm,
    account::LoginForm,
    account::AccountPage,
    account::HomePage,
    todo::TodoForm,
    todo::TodoItem,
    todo::TodoListPage,
    todo::TodoFormPage,
    todo::TodoDetailPage,
)))]
pub struct OpenApiSchemas;

#[derive(Deserialize)]
#[serde(untagged)]
enum CheckboxValue {
    Flag(bool),
    Text(String),
}

/// Reads an HTML checkbox value. Browsers leave unchecked boxes out of the form entirely, which
/// `#[serde(default)]` turns into false; a checked box sends its value attribute, "on" by default.
/// Anything other than an explicit false value counts as checked.
fn deserialize_checkbox<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let text = match CheckboxValue::deserialize(deserializer)? {
        CheckboxValue::Flag(flag) => return Ok(flag),
        CheckboxValue::Text(text) => text,
    };

    let unchecked = matches!(
        text.trim().to_ascii_lowercase().as_str(),
        "" | "off" | "false" | "0" | "no"
    );
    Ok(!unchecked)
}

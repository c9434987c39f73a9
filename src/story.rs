/// A story as returned by `item/{id}.json`. Field names follow the upstream wire
/// format so the records we serve look the same as the ones we fetched.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Deserialize, serde::Serialize)]
pub(crate) struct Story {
    pub(crate) id: i64,

    #[serde(rename = "by")]
    pub(crate) author: Option<String>,

    pub(crate) title: Option<String>,
    pub(crate) url: Option<String>,
    pub(crate) text: Option<String>,

    #[serde(default)]
    pub(crate) score: i64,
    #[serde(default)]
    pub(crate) descendants: i64,
    #[serde(default)]
    pub(crate) time: i64,

    #[serde(rename = "kids")]
    pub(crate) children: Option<Vec<i64>>,
}

/// Deserializes `body` matching object keys regardless of their case, so
/// `"Score"`, `"SCORE"` and `"score"` all land in `score`.
pub(crate) fn from_json_case_insensitive<T: serde::de::DeserializeOwned>(
    body: &str,
) -> Result<T, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    serde_json::from_value(lowercase_keys(value))
}

fn lowercase_keys(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => map
            .into_iter()
            .map(|(key, value)| (key.to_lowercase(), lowercase_keys(value)))
            .collect::<serde_json::Map<_, _>>()
            .into(),
        serde_json::Value::Array(items) => items.into_iter().map(lowercase_keys).collect(),
        other => other,
    }
}

use serde::{
    de::{self, IgnoredAny},
    Deserialize, Deserializer, Serialize,
};

/// Body of `POST /waste-info`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct WasteInfoRequest {
    pub location: String,
}

/// Body returned by `POST /waste-info`.
///
/// The backend answers failures with an `error` message instead of a
/// `reply`. A missing `reply`, or one that is not a list of centers,
/// decodes to an empty list. So does any body that is not a JSON object,
/// except `null`.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct WasteInfoResponse {
    pub reply: Vec<Center>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A recycling or waste facility.
#[rustfmt::skip]
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Center {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name          : Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address       : Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact       : Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opening_hours : Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description   : Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl<'de> Deserialize<'de> for WasteInfoResponse {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Fields {
            #[serde(default, deserialize_with = "lenient_reply")]
            reply: Vec<Center>,
            #[serde(default, deserialize_with = "lenient_error")]
            error: Option<String>,
        }

        // Sequences come first, otherwise `Fields` would accept them.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Body {
            Sequence(Vec<IgnoredAny>),
            Object(Fields),
            Other(IgnoredAny),
        }

        match Option::<Body>::deserialize(deserializer)? {
            Some(Body::Object(Fields { reply, error })) => Ok(Self { reply, error }),
            Some(Body::Sequence(_) | Body::Other(_)) => Ok(Self::default()),
            None => Err(de::Error::invalid_type(
                de::Unexpected::Unit,
                &"a waste info response",
            )),
        }
    }
}

fn lenient_error<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Message {
        Text(String),
        Other(IgnoredAny),
    }
    Ok(match Message::deserialize(deserializer)? {
        Message::Text(text) => Some(text),
        Message::Other(_) => None,
    })
}

fn lenient_reply<'de, D>(deserializer: D) -> Result<Vec<Center>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Reply {
        Centers(Vec<Center>),
        Malformed(IgnoredAny),
    }
    Ok(match Reply::deserialize(deserializer)? {
        Reply::Centers(centers) => centers,
        Reply::Malformed(_) => Vec::new(),
    })
}

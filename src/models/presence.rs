use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Field-presence wrapper for partial representations.
///
/// A field that was never assigned stays `Unset` and is omitted from the
/// serialized form entirely (pair with `skip_serializing_if = "Presence::is_unset"`).
/// This is distinct from a null-valued field: `Unset` never reaches the wire.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Presence<T> {
    #[default]
    Unset,
    Set(T),
}

impl<T> Presence<T> {
    pub fn set(value: T) -> Self {
        Presence::Set(value)
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, Presence::Unset)
    }

    pub fn is_set(&self) -> bool {
        !self.is_unset()
    }

    pub fn as_ref(&self) -> Option<&T> {
        match self {
            Presence::Set(value) => Some(value),
            Presence::Unset => None,
        }
    }
}

impl<T> From<Option<T>> for Presence<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Presence::Set(value),
            None => Presence::Unset,
        }
    }
}

impl<T: Serialize> Serialize for Presence<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Presence::Set(value) => value.serialize(serializer),
            // Unreachable when the field carries skip_serializing_if
            Presence::Unset => Err(serde::ser::Error::custom(
                "attempted to serialize an unset field",
            )),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Presence<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Missing keys are handled by #[serde(default)]; a present key is Set
        T::deserialize(deserializer).map(Presence::Set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Sparse {
        #[serde(default, skip_serializing_if = "Presence::is_unset")]
        email: Presence<String>,
        #[serde(default, skip_serializing_if = "Presence::is_unset")]
        username: Presence<String>,
    }

    #[test]
    fn unset_fields_are_omitted_not_null() {
        let sparse = Sparse {
            email: Presence::set("user@example.com".to_string()),
            username: Presence::Unset,
        };

        let json = serde_json::to_value(&sparse).unwrap();
        assert_eq!(json["email"], "user@example.com");
        assert!(json.as_object().unwrap().get("username").is_none());
        assert_eq!(serde_json::to_string(&sparse).unwrap(), r#"{"email":"user@example.com"}"#);
    }

    #[test]
    fn missing_keys_deserialize_as_unset() {
        let sparse: Sparse = serde_json::from_str(r#"{"email":"user@example.com"}"#).unwrap();
        assert_eq!(sparse.email, Presence::set("user@example.com".to_string()));
        assert!(sparse.username.is_unset());
    }

    #[test]
    fn from_option() {
        assert_eq!(Presence::from(Some(1)), Presence::Set(1));
        assert!(Presence::<i32>::from(None).is_unset());
    }
}

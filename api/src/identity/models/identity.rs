use diesel::prelude::*;
use serde_json::Value as JsonValue;

#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug)]
#[diesel(table_name = crate::schema::identities)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Identity {
    pub id: i32,
    pub traits: JsonValue,
    pub created_at: chrono::NaiveDateTime,
    pub updated_at: chrono::NaiveDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::identities)]
pub struct NewIdentity {
    pub traits: JsonValue,
    pub created_at: chrono::NaiveDateTime,
    pub updated_at: chrono::NaiveDateTime,
}

impl Identity {
    pub fn new_with_traits(traits: Traits) -> NewIdentity {
        let now = chrono::Utc::now().naive_utc();
        NewIdentity {
            traits: JsonValue::from(&traits),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn get_traits(&self) -> Traits {
        Traits::from(self.traits.clone())
    }

    /// The username rendered into `author` fields. Identities are expected to
    /// carry a `name` trait; ones that don't are logged and shown as "No name".
    pub fn display_name(&self) -> String {
        self.get_traits().name.unwrap_or_else(|| {
            tracing::error!("No name in traits found for identity ID `{}`", self.id);
            "No name".into()
        })
    }
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug)]
pub struct Traits {
    pub email: Option<String>,
    pub name: Option<String>,
}

// TODO maybe write a macro for this?
impl From<&Traits> for JsonValue {
    fn from(t: &Traits) -> Self {
        serde_json::to_value(t).unwrap()
    }
}

impl From<JsonValue> for Traits {
    fn from(value: JsonValue) -> Self {
        serde_json::from_value(value).unwrap()
    }
}

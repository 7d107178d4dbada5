//! Person profile and hobby catalog reads.

use super::decode::{decode_array, decode_optional_vertex, decode_vertex, DecodeError, Vertex};
use super::error::{store_call, GraphError, GraphResult};
use super::models::{CategoryRef, HobbyCatalog, HobbyRef, Person, PersonProfile};
use crate::neo4j::{GraphStore, PersonRecord};
use tokio_util::sync::CancellationToken;

/// Fetch and decode a person, failing with `NotFound` when absent.
pub(crate) async fn load_person(
    store: &dyn GraphStore,
    cancel: &CancellationToken,
    person_id: i64,
) -> GraphResult<(Person, PersonRecord)> {
    let record = store_call(cancel, store.get_person(person_id))
        .await?
        .ok_or(GraphError::NotFound(person_id))?;
    let person = Person::from_vertex(&decode_vertex(&record.person)?)?;
    Ok((person, record))
}

/// A person with hobby, hobby category and outgoing connection ids.
pub async fn person_profile(
    store: &dyn GraphStore,
    cancel: &CancellationToken,
    person_id: i64,
) -> GraphResult<PersonProfile> {
    let (person, record) = load_person(store, cancel, person_id).await?;

    let hobby = match decode_optional_vertex(&record.hobby)? {
        Some(hobby) => {
            let category = decode_optional_vertex(&record.category)?;
            Some(hobby_ref(&hobby, category.as_ref())?)
        }
        None => None,
    };

    Ok(PersonProfile {
        person,
        hobby,
        connections: decode_array(&record.connections)?,
    })
}

/// Every hobby with its category, ordered by hobby id.
pub async fn hobby_catalog(
    store: &dyn GraphStore,
    cancel: &CancellationToken,
) -> GraphResult<HobbyCatalog> {
    let records = store_call(cancel, store.list_hobbies()).await?;

    let mut items = Vec::with_capacity(records.len());
    for record in &records {
        let hobby = decode_vertex(&record.hobby)?;
        let category = decode_optional_vertex(&record.category)?;
        items.push(hobby_ref(&hobby, category.as_ref())?);
    }
    items.sort_by_key(|h| h.id);

    Ok(HobbyCatalog {
        total: items.len(),
        items,
    })
}

fn hobby_ref(hobby: &Vertex, category: Option<&Vertex>) -> Result<HobbyRef, DecodeError> {
    let category = match category {
        Some(c) => Some(CategoryRef {
            id: c.int("category_id")?,
            name: c.text("name")?,
        }),
        None => None,
    };
    Ok(HobbyRef {
        id: hobby.int("hobby_id")?,
        name: hobby.text("name")?,
        category,
    })
}

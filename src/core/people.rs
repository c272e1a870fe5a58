//! People business logic - the household members events can be tagged with.
//!
//! New people go to the end of the list (current max sort order + 1); sort
//! orders are never compacted after a delete. Deleting a person removes their
//! event links but leaves the events themselves alone.

use crate::{
    core::validate,
    entities::{EventPerson, Person, event_person, person},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{info, instrument};

const NAME_MAX: usize = 50;

/// Editable person fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonInput {
    /// 1-50 characters after trimming
    pub name: String,
    /// `#RRGGBB`
    pub color: String,
}

fn validated(input: PersonInput) -> Result<PersonInput> {
    let name = input.name.trim().to_string();
    validate::length_between("name", &name, 1, NAME_MAX)?;
    validate::hex_color("color", &input.color)?;
    Ok(PersonInput {
        name,
        color: input.color,
    })
}

/// Lists the caller's people in display order.
pub async fn list_people(db: &DatabaseConnection, account_id: i32) -> Result<Vec<person::Model>> {
    Person::find()
        .filter(person::Column::AccountId.eq(account_id))
        .order_by_asc(person::Column::SortOrder)
        .order_by_asc(person::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds one of the caller's people; other accounts' rows are invisible.
pub async fn get_person<C>(db: &C, account_id: i32, person_id: i32) -> Result<person::Model>
where
    C: ConnectionTrait,
{
    Person::find_by_id(person_id)
        .filter(person::Column::AccountId.eq(account_id))
        .one(db)
        .await?
        .ok_or(Error::not_found("Person", person_id))
}

/// Adds a person at the end of the caller's list.
#[instrument(skip(db))]
pub async fn create_person(
    db: &DatabaseConnection,
    account_id: i32,
    input: PersonInput,
) -> Result<person::Model> {
    let input = validated(input)?;

    let last = Person::find()
        .filter(person::Column::AccountId.eq(account_id))
        .order_by_desc(person::Column::SortOrder)
        .one(db)
        .await?;
    let sort_order = last.map_or(0, |p| p.sort_order) + 1;

    let person = person::ActiveModel {
        account_id: Set(account_id),
        name: Set(input.name),
        color: Set(input.color),
        sort_order: Set(sort_order),
        ..Default::default()
    };
    let created = person.insert(db).await?;
    info!(person_id = created.id, sort_order, "Person created");
    Ok(created)
}

/// Replaces a person's name and color, and their sort order when one is given.
#[instrument(skip(db))]
pub async fn update_person(
    db: &DatabaseConnection,
    account_id: i32,
    person_id: i32,
    input: PersonInput,
    sort_order: Option<i32>,
) -> Result<person::Model> {
    let input = validated(input)?;
    let existing = get_person(db, account_id, person_id).await?;

    let mut active: person::ActiveModel = existing.into();
    active.name = Set(input.name);
    active.color = Set(input.color);
    if let Some(sort_order) = sort_order {
        active.sort_order = Set(sort_order);
    }
    active.update(db).await.map_err(Into::into)
}

/// Deletes a person and their event links.
#[instrument(skip(db))]
pub async fn delete_person(db: &DatabaseConnection, account_id: i32, person_id: i32) -> Result<()> {
    let txn = db.begin().await?;

    let person = get_person(&txn, account_id, person_id).await?;

    let unlinked = EventPerson::delete_many()
        .filter(event_person::Column::PersonId.eq(person.id))
        .exec(&txn)
        .await?
        .rows_affected;
    person.delete(&txn).await?;

    txn.commit().await?;
    info!(person_id, unlinked, "Person deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entities::CalendarEvent;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_assigns_increasing_sort_order() -> Result<()> {
        let (db, account) = setup_with_account().await?;

        let first = create_test_person(&db, account.id, "Grandma").await?;
        let second = create_test_person(&db, account.id, "Grandpa").await?;
        assert_eq!(first.sort_order, 1);
        assert_eq!(second.sort_order, 2);

        // Sort orders are not compacted after a delete
        delete_person(&db, account.id, first.id).await?;
        let third = create_test_person(&db, account.id, "Aunt May").await?;
        assert_eq!(third.sort_order, 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_validation() -> Result<()> {
        let (db, account) = setup_with_account().await?;

        let blank = create_person(
            &db,
            account.id,
            PersonInput {
                name: "   ".to_string(),
                color: "#112233".to_string(),
            },
        )
        .await;
        assert!(matches!(blank, Err(Error::Validation { field: "name", .. })));

        let bad_color = create_person(
            &db,
            account.id,
            PersonInput {
                name: "Grandma".to_string(),
                color: "blue".to_string(),
            },
        )
        .await;
        assert!(matches!(bad_color, Err(Error::Validation { field: "color", .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_is_ordered_by_sort_order() -> Result<()> {
        let (db, account) = setup_with_account().await?;
        let a = create_test_person(&db, account.id, "A").await?;
        let b = create_test_person(&db, account.id, "B").await?;

        update_person(
            &db,
            account.id,
            a.id,
            PersonInput {
                name: "A".to_string(),
                color: a.color.clone(),
            },
            Some(10),
        )
        .await?;

        let people = list_people(&db, account.id).await?;
        let names: Vec<&str> = people.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
        assert_eq!(people[0].id, b.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_replaces_fields() -> Result<()> {
        let (db, account) = setup_with_account().await?;
        let person = create_test_person(&db, account.id, "Grandma").await?;

        let updated = update_person(
            &db,
            account.id,
            person.id,
            PersonInput {
                name: " Nana ".to_string(),
                color: "#ABCDEF".to_string(),
            },
            Some(4),
        )
        .await?;
        assert_eq!(updated.name, "Nana");
        assert_eq!(updated.color, "#ABCDEF");
        assert_eq!(updated.sort_order, 4);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_without_sort_order_keeps_position() -> Result<()> {
        let (db, account) = setup_with_account().await?;
        create_test_person(&db, account.id, "Grandma").await?;
        let grandpa = create_test_person(&db, account.id, "Grandpa").await?;

        let updated = update_person(
            &db,
            account.id,
            grandpa.id,
            PersonInput {
                name: "Pops".to_string(),
                color: grandpa.color.clone(),
            },
            None,
        )
        .await?;
        assert_eq!(updated.sort_order, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_person_keeps_events() -> Result<()> {
        let (db, account) = setup_with_account().await?;
        let grandma = create_test_person(&db, account.id, "Grandma").await?;
        let grandpa = create_test_person(&db, account.id, "Grandpa").await?;
        let event =
            create_test_event(&db, account.id, "Dinner", vec![grandma.id, grandpa.id]).await?;

        delete_person(&db, account.id, grandma.id).await?;

        assert!(CalendarEvent::find_by_id(event.id).one(&db).await?.is_some());
        let links = EventPerson::find()
            .filter(event_person::Column::EventId.eq(event.id))
            .all(&db)
            .await?;
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].person_id, grandpa.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_other_accounts_people_are_not_found() -> Result<()> {
        let (db, account) = setup_with_account().await?;
        let other = insert_other_account(&db).await?;
        let theirs = create_test_person(&db, other.id, "Neighbor").await?;

        assert!(list_people(&db, account.id).await?.is_empty());
        assert!(matches!(
            get_person(&db, account.id, theirs.id).await,
            Err(Error::NotFound { .. })
        ));
        let update = update_person(
            &db,
            account.id,
            theirs.id,
            PersonInput {
                name: "Mine now".to_string(),
                color: "#000000".to_string(),
            },
            None,
        )
        .await;
        assert!(matches!(update, Err(Error::NotFound { .. })));
        assert!(matches!(
            delete_person(&db, account.id, theirs.id).await,
            Err(Error::NotFound { .. })
        ));

        let untouched = Person::find_by_id(theirs.id).one(&db).await?.unwrap();
        assert_eq!(untouched.name, "Neighbor");
        Ok(())
    }
}

//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod account;
pub mod calendar_event;
pub mod event_person;
pub mod grocery_category;
pub mod grocery_item;
pub mod person;

// Re-export specific types to avoid conflicts
pub use account::{Column as AccountColumn, Entity as Account, Model as AccountModel};
pub use calendar_event::{
    Column as CalendarEventColumn, Entity as CalendarEvent, Model as CalendarEventModel,
    RecurrenceKind,
};
pub use event_person::{
    Column as EventPersonColumn, Entity as EventPerson, Model as EventPersonModel,
};
pub use grocery_category::{
    Column as GroceryCategoryColumn, Entity as GroceryCategory, Model as GroceryCategoryModel,
};
pub use grocery_item::{
    Column as GroceryItemColumn, Entity as GroceryItem, Model as GroceryItemModel,
};
pub use person::{Column as PersonColumn, Entity as Person, Model as PersonModel};

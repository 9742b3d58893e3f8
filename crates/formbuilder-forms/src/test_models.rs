//! Entities shared by the unit tests of this crate.

use chrono::{NaiveDate, NaiveDateTime};
use formbuilder_macros::Entity;

#[derive(Debug, Default, Entity)]
pub struct Car {
    #[column(type = "integer")]
    #[id]
    #[generated_value]
    pub id: Option<i64>,

    #[column(type = "string")]
    #[constraint(not_blank(message = "car.colorNotFilled"))]
    pub color: String,

    #[column(type = "date")]
    pub registered: Option<NaiveDate>,
}

#[derive(Debug, Default, Entity)]
pub struct User {
    #[column(type = "integer")]
    #[id]
    #[generated_value]
    pub id: Option<i64>,

    #[column(type = "string")]
    #[constraint(not_blank(message = "user.nameNotFilled"))]
    #[constraint(min_length(value = 3, message = "user.nameTooShort"))]
    pub name: String,

    #[column(type = "string")]
    #[password]
    pub password: String,

    #[column(type = "text")]
    pub bio: String,

    #[column(type = "boolean")]
    pub active: bool,

    #[column(type = "integer")]
    #[constraint(range(min = 1, max = 120, message = "user.ageOutOfRange"))]
    pub age: Option<i64>,

    #[column(type = "datetime")]
    pub last_login: Option<NaiveDateTime>,

    #[form_ignore]
    #[column(type = "string")]
    pub secret: String,

    #[one_to_one(target_entity = "Car")]
    pub car: Option<Car>,
}

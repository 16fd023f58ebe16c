use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A company record.
///
/// Not indexed by this crate; it only round-trips through JSON with
/// camel-cased property names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    age: i32,
    company_name: String,
    date_of_estd: DateTime<Utc>,
}

impl Company {
    /// Creates a company record.
    pub fn new(age: i32, company_name: impl Into<String>, date_of_estd: DateTime<Utc>) -> Self {
        Self {
            age,
            company_name: company_name.into(),
            date_of_estd,
        }
    }

    /// Age of the company in years.
    pub fn age(&self) -> i32 {
        self.age
    }

    /// Sets the age.
    pub fn set_age(&mut self, age: i32) {
        self.age = age;
    }

    /// Name of the company.
    pub fn company_name(&self) -> &str {
        &self.company_name
    }

    /// Sets the name.
    pub fn set_company_name(&mut self, company_name: impl Into<String>) {
        self.company_name = company_name.into();
    }

    /// Date the company was established.
    pub fn date_of_estd(&self) -> DateTime<Utc> {
        self.date_of_estd
    }

    /// Sets the establishment date.
    pub fn set_date_of_estd(&mut self, date_of_estd: DateTime<Utc>) {
        self.date_of_estd = date_of_estd;
    }
}

impl fmt::Display for Company {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Company [age={}, companyName={}, dateOfEstd={}]",
            self.age,
            self.company_name,
            self.date_of_estd.to_rfc3339()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn acme() -> Company {
        Company::new(12, "Acme", Utc.with_ymd_and_hms(2013, 5, 1, 0, 0, 0).unwrap())
    }

    #[test]
    fn test_company_json_uses_camel_case() {
        let json = serde_json::to_value(acme()).unwrap();
        assert_eq!(json["age"], 12);
        assert_eq!(json["companyName"], "Acme");
        assert_eq!(json["dateOfEstd"], "2013-05-01T00:00:00Z");

        let back: Company = serde_json::from_value(json).unwrap();
        assert_eq!(back, acme());
    }

    #[test]
    fn test_company_setters() {
        let mut company = acme();
        company.set_age(13);
        company.set_company_name("Acme Corp");
        assert_eq!(company.age(), 13);
        assert_eq!(company.company_name(), "Acme Corp");
        assert_eq!(
            company.to_string(),
            "Company [age=13, companyName=Acme Corp, dateOfEstd=2013-05-01T00:00:00+00:00]"
        );
    }
}

//! Catalog of the mock-interview targets offered by the interview picker.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Company {
    Google,
    Amazon,
    Meta,
    Microsoft,
}

impl Company {
    pub fn name(self) -> &'static str {
        match self {
            Company::Google => "Google",
            Company::Amazon => "Amazon",
            Company::Meta => "Meta",
            Company::Microsoft => "Microsoft",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Company::Google => "Practice for Google's rigorous technical and behavioral interviews",
            Company::Amazon => "Prepare for Amazon's leadership principles and coding challenges",
            Company::Meta => "Get ready for Meta's problem-solving and system design interviews",
            Company::Microsoft => "Practice Microsoft's collaborative and technical interview process",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum InterviewRole {
    Frontend,
    Backend,
    Fullstack,
    Data,
    /// The picker's default selection is sent as `general`.
    #[serde(alias = "general")]
    #[strum(serialize = "swe", serialize = "general", to_string = "swe")]
    Swe,
}

impl InterviewRole {
    pub fn name(self) -> &'static str {
        match self {
            InterviewRole::Frontend => "Frontend Engineer",
            InterviewRole::Backend => "Backend Engineer",
            InterviewRole::Fullstack => "Full-Stack Engineer",
            InterviewRole::Data => "Data Engineer/Scientist",
            InterviewRole::Swe => "Software Engineer (General)",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            InterviewRole::Frontend => "UI frameworks, JavaScript, accessibility, and responsive design",
            InterviewRole::Backend => "APIs, system design, data processing, and server infrastructure",
            InterviewRole::Fullstack => {
                "End-to-end development, from UI to databases and everything in between"
            }
            InterviewRole::Data => "Data structures, algorithms, machine learning, and data analysis",
            InterviewRole::Swe => "Core CS concepts, problem-solving, and coding challenges",
        }
    }
}

/// A company + role pair selecting a mock-interview persona.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewProfile {
    pub company: Company,
    pub role: InterviewRole,
}

/// One selectable entry of the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
    pub description: String,
}

pub fn companies() -> Vec<CatalogEntry> {
    Company::iter()
        .map(|c| CatalogEntry {
            id: c.to_string(),
            name: c.name().to_owned(),
            description: c.description().to_owned(),
        })
        .collect()
}

pub fn roles() -> Vec<CatalogEntry> {
    InterviewRole::iter()
        .map(|r| CatalogEntry {
            id: r.to_string(),
            name: r.name().to_owned(),
            description: r.description().to_owned(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn general_is_an_alias_for_swe() {
        assert_eq!(InterviewRole::from_str("general").unwrap(), InterviewRole::Swe);
        assert_eq!(InterviewRole::from_str("swe").unwrap(), InterviewRole::Swe);
        assert_eq!(InterviewRole::Swe.to_string(), "swe");
    }

    #[test]
    fn unknown_company_is_rejected() {
        assert!(Company::from_str("netflix").is_err());
    }

    #[test]
    fn catalog_ids_parse_back() {
        for entry in companies() {
            assert!(Company::from_str(&entry.id).is_ok(), "{}", entry.id);
        }
        for entry in roles() {
            assert!(InterviewRole::from_str(&entry.id).is_ok(), "{}", entry.id);
        }
        assert_eq!(companies().len(), 4);
        assert_eq!(roles().len(), 5);
    }
}

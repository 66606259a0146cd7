//! Structured output records
//!
//! One [`CompanyRecord`] is produced per work item. Every leaf field is
//! independently optional: extraction is best-effort and a missing field is
//! normal, not an error. A record is only worth persisting when its primary
//! identity field (the company name) was found — see
//! [`CompanyRecord::is_collected`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity fields of a company
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Identity {
    /// Registered company name. Gate field: the record is only persisted
    /// when this is present.
    pub name: Option<String>,

    /// Organization number (the work item's business key)
    pub org_number: Option<String>,

    /// Legal form (e.g. limited company, sole trader)
    pub legal_form: Option<String>,

    /// Registration status
    pub status: Option<String>,

    /// Registration date as displayed by the source
    pub registration_date: Option<String>,

    /// Remark/flag text shown on the company, if any
    pub remark: Option<String>,
}

/// A postal address split into best-effort components
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: Option<String>,

    /// Five-digit postal code with the internal space removed
    pub postal_code: Option<String>,

    pub city: Option<String>,

    /// Apartment designator (`lgh NNNN`) lifted out of the raw line
    pub apartment: Option<String>,
}

impl Address {
    /// Returns true if no component was recognized
    pub fn is_empty(&self) -> bool {
        self.street.is_none()
            && self.postal_code.is_none()
            && self.city.is_none()
            && self.apartment.is_none()
    }
}

/// Contact and location fields
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Contact {
    pub phone: Option<String>,
    pub address: Option<Address>,
    pub municipality: Option<String>,
    pub county: Option<String>,

    /// Payment account number resolved through the auxiliary registry lookup
    pub bankgiro: Option<String>,
}

/// Tax registration flags
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaxStatus {
    pub f_skatt: Option<bool>,
    pub vat_registered: Option<bool>,
    pub employer: Option<bool>,
}

/// Key figures for one reporting period
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Financials {
    /// Period label as displayed (e.g. a year)
    pub period: Option<String>,

    pub currency: Option<String>,

    /// Figures are scaled to base currency units; a dash or otherwise
    /// non-numeric display value stays absent, never zero.
    pub revenue: Option<i64>,
    pub profit_after_financial_items: Option<i64>,
    pub net_profit: Option<i64>,
    pub total_assets: Option<i64>,
}

/// Industry classification fields
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Industry {
    pub sni_code: Option<String>,
    pub sni_description: Option<String>,
    pub categories: Vec<String>,
    pub description: Option<String>,
}

/// Details collected from one person's profile page
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonDetails {
    pub name: Option<String>,
    pub age: Option<u32>,
    pub phone: Option<String>,
    pub personal_number: Option<String>,
    pub address: Option<Address>,
    pub profile_url: Option<String>,
}

/// One board member or other related person
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelatedPerson {
    /// Role label as listed on the company page
    pub role: Option<String>,

    /// Display name as listed on the company page; dedup key within a record
    pub display_name: String,

    /// Profile details, if the person page was visited
    pub details: Option<PersonDetails>,
}

/// The structured output for one work item
///
/// Populated incrementally across navigation steps and immutable once handed
/// to the record sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub identity: Identity,
    pub contact: Contact,
    pub tax: TaxStatus,
    pub financials: Financials,
    pub industry: Industry,

    /// Phone numbers collected from the phones subpage
    pub phones: Vec<String>,

    /// Related people, deduplicated by display name (first occurrence wins)
    pub board: Vec<RelatedPerson>,

    /// Detail page URL the record was collected from
    pub source_url: Option<String>,

    pub collected_at: DateTime<Utc>,
}

impl CompanyRecord {
    /// Creates an empty record for the given organization number
    pub fn new(org_number: &str) -> Self {
        Self {
            identity: Identity {
                org_number: Some(org_number.to_string()),
                ..Identity::default()
            },
            contact: Contact::default(),
            tax: TaxStatus::default(),
            financials: Financials::default(),
            industry: Industry::default(),
            phones: Vec::new(),
            board: Vec::new(),
            source_url: None,
            collected_at: Utc::now(),
        }
    }

    /// Returns true if the record passed the identity gate and may be
    /// handed to the record sink
    pub fn is_collected(&self) -> bool {
        self.identity
            .name
            .as_deref()
            .map(|n| !n.trim().is_empty())
            .unwrap_or(false)
    }

    /// Adds a related person unless one with the same display name is
    /// already present. Returns true if the entry was added.
    pub fn push_person(&mut self, person: RelatedPerson) -> bool {
        if person.display_name.is_empty() {
            return false;
        }
        if self
            .board
            .iter()
            .any(|p| p.display_name == person.display_name)
        {
            return false;
        }
        self.board.push(person);
        true
    }
}

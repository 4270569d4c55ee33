/// Contact group registry for message recipients.
///
/// Defines the default groups an operator can address a message to
/// (community leaders, emergency services, NEMA officials), with each
/// contact's phone number in `+234-XXX-XXX-XXXX` form. Other modules
/// should resolve recipients from here rather than hardcoding numbers.

use std::collections::HashSet;

use crate::model::{Contact, ContactGroup};

// ---------------------------------------------------------------------------
// Static registry
// ---------------------------------------------------------------------------

/// A contact as stored in the static registry.
pub struct ContactEntry {
    pub name: &'static str,
    /// Nigerian mobile number, `+234-XXX-XXX-XXXX`.
    pub phone: &'static str,
    pub email: Option<&'static str>,
    pub role: &'static str,
}

/// A named group of contacts.
pub struct GroupEntry {
    /// Stable identifier used when composing messages, e.g. "nema-officials".
    pub id: &'static str,
    pub name: &'static str,
    pub contacts: &'static [ContactEntry],
}

/// Default contact groups, ordered from community level up to the
/// state emergency agency.
pub static CONTACT_GROUP_REGISTRY: &[GroupEntry] = &[
    GroupEntry {
        id: "community-leaders",
        name: "Community Leaders",
        contacts: &[
            ContactEntry {
                name: "Malam Sani Ibrahim",
                phone: "+234-803-123-4567",
                email: Some("sani@community.ng"),
                role: "Community Leader",
            },
            ContactEntry {
                name: "Mrs. Fatima Usman",
                phone: "+234-807-987-6543",
                email: Some("fatima@women.ng"),
                role: "Women's Group Leader",
            },
            ContactEntry {
                name: "Chief John Adamu",
                phone: "+234-809-456-7890",
                email: None,
                role: "Traditional Ruler",
            },
        ],
    },
    GroupEntry {
        id: "emergency-services",
        name: "Emergency Services",
        contacts: &[
            ContactEntry {
                name: "Dr. Ahmed Bello",
                phone: "+234-811-234-5678",
                email: Some("ahmed@health.gov.ng"),
                role: "Health Center Director",
            },
            ContactEntry {
                name: "Inspector Kemi Okafor",
                phone: "+234-813-567-8901",
                email: None,
                role: "Police Station Commander",
            },
            ContactEntry {
                name: "Fire Chief Yakubu",
                phone: "+234-815-890-1234",
                email: None,
                role: "Fire Service Chief",
            },
        ],
    },
    GroupEntry {
        id: "nema-officials",
        name: "NEMA Officials",
        contacts: &[
            ContactEntry {
                name: "Dir. Amina Hassan",
                phone: "+234-817-123-4567",
                email: Some("amina@nema.gov.ng"),
                role: "NEMA State Coordinator",
            },
            ContactEntry {
                name: "Eng. Babatunde Ola",
                phone: "+234-819-456-7890",
                email: None,
                role: "Emergency Response Manager",
            },
        ],
    },
];

// ---------------------------------------------------------------------------
// Lookups
// ---------------------------------------------------------------------------

/// Looks up a group by id. Returns `None` if not found.
pub fn find_group(group_id: &str) -> Option<&'static GroupEntry> {
    CONTACT_GROUP_REGISTRY.iter().find(|g| g.id == group_id)
}

/// Finds the contact owning a phone number, along with its group id.
pub fn find_contact_by_phone(phone: &str) -> Option<(&'static str, &'static ContactEntry)> {
    CONTACT_GROUP_REGISTRY.iter().find_map(|g| {
        g.contacts
            .iter()
            .find(|c| c.phone == phone)
            .map(|c| (g.id, c))
    })
}

/// Every phone number in the registry, in registry order.
pub fn all_phone_numbers() -> Vec<&'static str> {
    CONTACT_GROUP_REGISTRY
        .iter()
        .flat_map(|g| g.contacts.iter().map(|c| c.phone))
        .collect()
}

/// Phone numbers for the given groups, de-duplicated and in first-seen
/// order. Unknown group ids contribute nothing.
pub fn resolve_recipients(group_ids: &[&str]) -> Vec<String> {
    let mut seen = HashSet::new();
    group_ids
        .iter()
        .filter_map(|id| find_group(id))
        .flat_map(|g| g.contacts.iter())
        .filter(|c| seen.insert(c.phone))
        .map(|c| c.phone.to_string())
        .collect()
}

/// Owned copies of the registry, in the form the entity store keeps.
pub fn default_contact_groups() -> Vec<ContactGroup> {
    CONTACT_GROUP_REGISTRY
        .iter()
        .map(|g| ContactGroup {
            id: g.id.to_string(),
            name: g.name.to_string(),
            contacts: g
                .contacts
                .iter()
                .map(|c| Contact {
                    name: c.name.to_string(),
                    phone: c.phone.to_string(),
                    email: c.email.map(str::to_string),
                    role: c.role.to_string(),
                })
                .collect(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

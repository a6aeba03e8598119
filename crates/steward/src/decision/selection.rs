//! Resolving selected positions against an entity snapshot.

use crate::entity::Entity;
use crate::error::{Result, StewardError};

use super::model::{ItemDetail, Section, SectionDetails, SectionIndices};

/// Number of items an entity holds in a section.
pub fn section_len(entity: &Entity, section: Section) -> usize {
    match section {
        Section::Credentials => entity.credentials.len(),
        Section::Addresses => entity.addresses.len(),
        Section::Phones => entity.phones.len(),
        Section::Emails => entity.emails.len(),
        Section::Affiliations => entity.affiliations.len(),
        Section::Sources => entity.sources.len(),
    }
}

/// Describe the item at a 1-based position, or `None` if out of range.
///
/// ```
/// use steward::decision::{resolve_item, Section};
/// use steward::entity::Entity;
///
/// let entity = Entity::new("HCP-1", "Ana")
///     .with_phone("11999998888")
///     .with_phone("21988887777")
///     .with_phone("3133334444");
///
/// let item = resolve_item(&entity, Section::Phones, 2).unwrap();
/// assert_eq!(item.value, "21988887777");
/// assert_eq!(item.label, "Phone #2: 21988887777");
/// ```
pub fn resolve_item(entity: &Entity, section: Section, position: usize) -> Option<ItemDetail> {
    let idx = position.checked_sub(1)?;
    let ordinal = |ordinal: Option<u32>| ordinal.map(|o| o as usize).unwrap_or(position);

    let (value, label) = match section {
        Section::Credentials => {
            let credential = entity.credentials.get(idx)?;
            let key = credential.display_key();
            (key.clone(), format!("Credential {}", key))
        }
        Section::Addresses => {
            let address = entity.addresses.get(idx)?;
            (
                address.one_line(),
                format!("Address #{}", ordinal(address.ordinal)),
            )
        }
        Section::Phones => {
            let phone = entity.phones.get(idx)?;
            let value = phone.number.clone().unwrap_or_default();
            let label = format!("Phone #{}: {}", ordinal(phone.ordinal), value);
            (value, label)
        }
        Section::Emails => {
            let email = entity.emails.get(idx)?;
            let value = email.address.clone().unwrap_or_default();
            let label = format!("Email #{}: {}", ordinal(email.ordinal), value);
            (value, label)
        }
        Section::Affiliations => {
            let affiliation = entity.affiliations.get(idx)?;
            let value = affiliation.display_name().unwrap_or("-").to_string();
            let label = format!("Affiliation #{}: {}", ordinal(affiliation.ordinal), value);
            (value, label)
        }
        Section::Sources => {
            let source = entity.sources.get(idx)?;
            let value = source
                .name
                .as_deref()
                .or(source.origin.as_deref())
                .unwrap_or("-")
                .to_string();
            let label = format!("Source #{}: {}", ordinal(source.ordinal), value);
            (value, label)
        }
    };

    Some(ItemDetail {
        index: position,
        value,
        label,
    })
}

/// Resolve every selected position. Duplicate positions within a section are
/// collapsed; sections with nothing selected are dropped.
///
/// A position of zero or past the end of its section is `InvalidInput`.
pub fn resolve_selection(entity: &Entity, indices: &SectionIndices) -> Result<SectionDetails> {
    let mut resolved = SectionDetails::new();

    for (section, positions) in indices {
        let mut items: Vec<ItemDetail> = Vec::with_capacity(positions.len());
        for &position in positions {
            if items.iter().any(|i| i.index == position) {
                continue;
            }
            let item = resolve_item(entity, *section, position).ok_or_else(|| {
                StewardError::InvalidInput(format!(
                    "{} #{} does not exist on entity {} ({} item(s))",
                    section.label(),
                    position,
                    entity.id,
                    section_len(entity, *section)
                ))
            })?;
            items.push(item);
        }
        if !items.is_empty() {
            resolved.entry(*section).or_default().extend(items);
        }
    }

    Ok(resolved)
}

/// Merge positions from the raw and resolved request forms, in request order.
pub fn merge_requested(
    selected_items: Option<&SectionIndices>,
    item_details: Option<&SectionDetails>,
) -> SectionIndices {
    let mut merged = SectionIndices::new();

    if let Some(selected) = selected_items {
        for (section, positions) in selected {
            merged.entry(*section).or_default().extend(positions.iter().copied());
        }
    }
    if let Some(details) = item_details {
        for (section, items) in details {
            merged
                .entry(*section)
                .or_default()
                .extend(items.iter().map(|d| d.index));
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Address, Affiliation, Credential};

    fn entity() -> Entity {
        Entity::new("HCP-1", "Ana")
            .with_credential(Credential::new("SP", "123456"))
            .with_phone("11999998888")
            .with_phone("21988887777")
            .with_phone("3133334444")
            .with_email("a@b.com")
            .with_affiliation(Affiliation {
                legal_name: Some("Clinica Ltda".into()),
                ..Affiliation::default()
            })
            .with_address(Address {
                ordinal: Some(7),
                formatted: Some("Av. Paulista 1000".into()),
                ..Address::default()
            })
    }

    #[test]
    fn test_resolves_second_phone() {
        let mut indices = SectionIndices::new();
        indices.insert(Section::Phones, vec![2]);

        let resolved = resolve_selection(&entity(), &indices).unwrap();
        assert_eq!(resolved[&Section::Phones][0].value, "21988887777");
        assert_eq!(resolved[&Section::Phones][0].index, 2);
    }

    #[test]
    fn test_labels_use_ordinal_when_present() {
        let e = entity();
        assert_eq!(
            resolve_item(&e, Section::Addresses, 1).unwrap().label,
            "Address #7"
        );
        assert_eq!(
            resolve_item(&e, Section::Credentials, 1).unwrap().label,
            "Credential 123456/SP"
        );
        assert_eq!(
            resolve_item(&e, Section::Affiliations, 1).unwrap().value,
            "Clinica Ltda"
        );
    }

    #[test]
    fn test_out_of_range_and_zero_are_rejected() {
        let mut indices = SectionIndices::new();
        indices.insert(Section::Emails, vec![2]);
        let err = resolve_selection(&entity(), &indices).unwrap_err();
        assert!(matches!(err, StewardError::InvalidInput(_)));

        assert!(resolve_item(&entity(), Section::Phones, 0).is_none());
    }

    #[test]
    fn test_duplicates_collapsed_and_empty_sections_dropped() {
        let mut indices = SectionIndices::new();
        indices.insert(Section::Phones, vec![3, 1, 3]);
        indices.insert(Section::Sources, vec![]);

        let resolved = resolve_selection(&entity(), &indices).unwrap();
        let phones: Vec<usize> = resolved[&Section::Phones].iter().map(|d| d.index).collect();
        assert_eq!(phones, vec![3, 1]);
        assert!(!resolved.contains_key(&Section::Sources));
    }

    #[test]
    fn test_merge_requested_forms() {
        let mut selected = SectionIndices::new();
        selected.insert(Section::Phones, vec![1]);
        let mut details = SectionDetails::new();
        details.insert(
            Section::Phones,
            vec![ItemDetail {
                index: 2,
                value: "stale".into(),
                label: "stale".into(),
            }],
        );

        let merged = merge_requested(Some(&selected), Some(&details));
        assert_eq!(merged[&Section::Phones], vec![1, 2]);
    }
}

//! Person profile page extraction

use crate::client::{ClientError, PageClient};
use crate::config::PersonSelectors;
use crate::extract::{opt_text, parse_address, parse_first_integer};
use crate::record::PersonDetails;

/// Runs all person-page field extractors against the current page
pub async fn extract_person(
    client: &mut dyn PageClient,
    selectors: &PersonSelectors,
) -> Result<PersonDetails, ClientError> {
    let mut details = PersonDetails {
        profile_url: client.current_url(),
        ..PersonDetails::default()
    };

    details.name = opt_text(client, &selectors.name).await?;
    details.age = opt_text(client, &selectors.age)
        .await?
        .and_then(|t| parse_first_integer(&t));
    details.phone = opt_text(client, &selectors.phone).await?;
    details.personal_number = opt_text(client, &selectors.personal_number).await?;
    if let Some(raw) = opt_text(client, &selectors.address).await? {
        let parsed = parse_address(&raw);
        if !parsed.is_empty() {
            details.address = Some(parsed);
        }
    }

    Ok(details)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::scripted::{ScriptedPage, ScriptedSite};
    use crate::client::PageClient;
    use crate::config::test_support::site_profile;

    #[tokio::test]
    async fn test_person_page_extraction() {
        let site = ScriptedSite::default();
        site.insert_page(
            "https://reg.test/person/anna",
            ScriptedPage::default()
                .with_text("h1 .name", "Anna Svensson")
                .with_text(".age span", "45 år")
                .with_text(".person-address", "Storgatan 1 lgh 1203, 111 22 Stockholm"),
        );

        let mut client = site.client();
        client.navigate("https://reg.test/person/anna").await.unwrap();

        let profile = site_profile();
        let details = extract_person(&mut client, &profile.person).await.unwrap();

        assert_eq!(details.name.as_deref(), Some("Anna Svensson"));
        assert_eq!(details.age, Some(45));
        assert_eq!(
            details.profile_url.as_deref(),
            Some("https://reg.test/person/anna")
        );
        let address = details.address.unwrap();
        assert_eq!(address.apartment.as_deref(), Some("lgh 1203"));
        assert_eq!(address.postal_code.as_deref(), Some("11122"));
    }

    #[tokio::test]
    async fn test_person_page_with_nothing_found() {
        let site = ScriptedSite::default();
        site.insert_page("https://reg.test/person/tom", ScriptedPage::default());

        let mut client = site.client();
        client.navigate("https://reg.test/person/tom").await.unwrap();

        let profile = site_profile();
        let details = extract_person(&mut client, &profile.person).await.unwrap();

        assert_eq!(details.name, None);
        assert_eq!(details.age, None);
        assert_eq!(details.address, None);
        assert!(details.profile_url.is_some());
    }
}

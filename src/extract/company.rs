//! Company detail page extraction
//!
//! Populates a [`CompanyRecord`] from the currently loaded detail page.
//! Every field is attempted independently; only real client failures abort
//! the visit.

use crate::client::{ClientError, PageClient};
use crate::config::SiteProfile;
use crate::extract::{
    clean_text, opt_text, parse_address, parse_affirmative, parse_scaled_figure, split_sni_line,
};
use crate::record::CompanyRecord;

/// Runs all company-page field extractors against the current page
pub async fn extract_company(
    client: &mut dyn PageClient,
    site: &SiteProfile,
    record: &mut CompanyRecord,
) -> Result<(), ClientError> {
    let selectors = &site.company;

    // Identity
    record.identity.name = opt_text(client, &Some(selectors.name.clone())).await?;
    if let Some(found) = opt_text(client, &selectors.org_number).await? {
        record.identity.org_number = Some(found);
    }
    record.identity.legal_form = opt_text(client, &selectors.legal_form).await?;
    record.identity.status = opt_text(client, &selectors.status).await?;
    record.identity.registration_date = opt_text(client, &selectors.registration_date).await?;
    record.identity.remark = opt_text(client, &selectors.remark).await?;

    // Contact
    record.contact.phone = opt_text(client, &selectors.phone).await?;
    if let Some(raw) = opt_text(client, &selectors.address).await? {
        // The address block often repeats the company name on its first
        // line; strip it before splitting into components.
        let line = match record.identity.name.as_deref() {
            Some(name) => clean_text(raw.replace(name, "").trim().trim_start_matches(',')),
            None => raw,
        };
        let parsed = parse_address(&line);
        if !parsed.is_empty() {
            record.contact.address = Some(parsed);
        }
    }
    record.contact.municipality = opt_text(client, &selectors.municipality).await?;
    record.contact.county = opt_text(client, &selectors.county).await?;

    // Tax flags
    let marker = site.affirmative.as_deref();
    record.tax.f_skatt =
        parse_affirmative(opt_text(client, &selectors.f_skatt).await?.as_deref(), marker);
    record.tax.vat_registered = parse_affirmative(
        opt_text(client, &selectors.vat_registered).await?.as_deref(),
        marker,
    );
    record.tax.employer = parse_affirmative(
        opt_text(client, &selectors.employer).await?.as_deref(),
        marker,
    );

    // Financials
    let suffix = site.unit_suffix.as_deref();
    let multiplier = site.unit_multiplier.unwrap_or(1);
    record.financials.period = opt_text(client, &selectors.financial_period).await?;
    record.financials.currency = site.currency.clone();
    record.financials.revenue = opt_text(client, &selectors.revenue)
        .await?
        .and_then(|t| parse_scaled_figure(&t, suffix, multiplier));
    record.financials.profit_after_financial_items =
        opt_text(client, &selectors.profit_after_financial_items)
            .await?
            .and_then(|t| parse_scaled_figure(&t, suffix, multiplier));
    record.financials.net_profit = opt_text(client, &selectors.net_profit)
        .await?
        .and_then(|t| parse_scaled_figure(&t, suffix, multiplier));
    record.financials.total_assets = opt_text(client, &selectors.total_assets)
        .await?
        .and_then(|t| parse_scaled_figure(&t, suffix, multiplier));

    // Industry
    if let Some(sni) = opt_text(client, &selectors.sni).await? {
        let (code, description) = split_sni_line(&sni);
        record.industry.sni_code = code;
        record.industry.sni_description = description;
    }
    if let Some(sel) = &selectors.categories {
        record.industry.categories = client
            .find_all(sel)
            .await?
            .into_iter()
            .map(|el| clean_text(&el.text))
            .filter(|t| !t.is_empty())
            .collect();
    }
    record.industry.description = opt_text(client, &selectors.description).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::scripted::{ScriptedPage, ScriptedSite};
    use crate::client::{PageClient, PageElement};
    use crate::config::test_support::site_profile;

    #[tokio::test]
    async fn test_missing_fields_stay_absent() {
        let site = ScriptedSite::default();
        site.insert_page(
            "https://reg.test/company/1",
            ScriptedPage::default().with_text("h1 .name", "Example AB"),
        );

        let mut client = site.client();
        client.navigate("https://reg.test/company/1").await.unwrap();

        let profile = site_profile();
        let mut record = CompanyRecord::new("556631-3788");
        extract_company(&mut client, &profile, &mut record)
            .await
            .unwrap();

        assert_eq!(record.identity.name.as_deref(), Some("Example AB"));
        assert_eq!(record.identity.legal_form, None);
        assert_eq!(record.financials.revenue, None);
        assert!(record.industry.categories.is_empty());
        assert!(record.is_collected());
    }

    #[tokio::test]
    async fn test_full_detail_page() {
        let site = ScriptedSite::default();
        site.insert_page(
            "https://reg.test/company/1",
            ScriptedPage::default()
                .with_text("h1 .name", "Example AB")
                .with_text(".legal-form td", "Aktiebolag")
                .with_text(".address", "Example AB, Stuvaregatan 11, 252 67 Helsingborg")
                .with_text(".f-skatt td", "Ja")
                .with_text(".vat td", "Nej")
                .with_text(".revenue span", "1 234 tkr")
                .with_text(".sni", "62010 - Dataprogrammering")
                .with_elements(
                    ".categories a",
                    vec![
                        PageElement {
                            text: "Datakonsulter".to_string(),
                            link: None,
                        },
                        PageElement {
                            text: "IT-tjänster".to_string(),
                            link: None,
                        },
                    ],
                ),
        );

        let mut client = site.client();
        client.navigate("https://reg.test/company/1").await.unwrap();

        let profile = site_profile();
        let mut record = CompanyRecord::new("556631-3788");
        extract_company(&mut client, &profile, &mut record)
            .await
            .unwrap();

        assert_eq!(record.identity.legal_form.as_deref(), Some("Aktiebolag"));
        let address = record.contact.address.unwrap();
        assert_eq!(address.street.as_deref(), Some("Stuvaregatan 11"));
        assert_eq!(address.postal_code.as_deref(), Some("25267"));
        assert_eq!(record.tax.f_skatt, Some(true));
        assert_eq!(record.tax.vat_registered, Some(false));
        assert_eq!(record.tax.employer, None);
        assert_eq!(record.financials.revenue, Some(1_234_000));
        assert_eq!(record.industry.sni_code.as_deref(), Some("62010"));
        assert_eq!(record.industry.categories.len(), 2);
    }
}

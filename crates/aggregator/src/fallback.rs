//! Built-in fallback dataset
//!
//! Served, tagged `source = fallback`, whenever every live provider fails or
//! returns nothing for a query. Never blended with provider data.

use shared::{
    create_slug, Article, ArticleContent, Dataset, LawFirm, RecordKind, SettlementRecord, Source,
};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn fallback_id(index: usize) -> String {
    format!("fallback_{}", index + 1)
}

/// Fallback dataset of the given kind
pub fn dataset(kind: RecordKind) -> Dataset {
    match kind {
        RecordKind::Article => Dataset::Articles(articles()),
        RecordKind::LawFirm => Dataset::LawFirms(law_firms()),
        RecordKind::Settlement => Dataset::Settlements(settlements()),
    }
}

/// Fallback settlements narrowed to `condition`, or all of them when none match
pub fn settlements_for(condition: Option<&str>) -> Dataset {
    let all = settlements();
    let Some(condition) = condition.map(str::trim).filter(|c| !c.is_empty()) else {
        return Dataset::Settlements(all);
    };

    let matching: Vec<SettlementRecord> = all
        .iter()
        .filter(|s| s.matches_condition(condition))
        .cloned()
        .collect();

    if matching.is_empty() {
        Dataset::Settlements(all)
    } else {
        Dataset::Settlements(matching)
    }
}

struct ArticleSeed {
    title: &'static str,
    description: &'static str,
    category: &'static str,
    overview: &'static str,
    symptoms: &'static [&'static str],
    causes: &'static [&'static str],
    treatments: &'static [&'static str],
    legal_options: &'static [&'static str],
    settlements: &'static str,
}

const ARTICLES: &[ArticleSeed] = &[
    ArticleSeed {
        title: "Mesothelioma",
        description: "An aggressive cancer of the lining of the lungs or abdomen caused by asbestos exposure.",
        category: "Cancer",
        overview: "Mesothelioma develops decades after asbestos fibers are inhaled or swallowed. \
                   Most patients were exposed at work in shipyards, construction, manufacturing or the military.",
        symptoms: &["Chest pain", "Shortness of breath", "Persistent cough", "Unexplained weight loss"],
        causes: &["Occupational asbestos exposure", "Secondary exposure from work clothing"],
        treatments: &["Surgery", "Chemotherapy", "Radiation therapy", "Immunotherapy"],
        legal_options: &["Personal injury lawsuit", "Wrongful death claim", "Asbestos trust fund claim"],
        settlements: "Mesothelioma settlements commonly range from $1 million to $5 million.",
    },
    ArticleSeed {
        title: "Roundup Weed Killer",
        description: "Glyphosate-based herbicide linked to non-Hodgkin lymphoma.",
        category: "Chemical Exposure",
        overview: "Farmers, landscapers and home gardeners who used Roundup regularly have reported \
                   non-Hodgkin lymphoma diagnoses linked to long-term glyphosate exposure.",
        symptoms: &["Swollen lymph nodes", "Fatigue", "Night sweats", "Fever"],
        causes: &["Repeated glyphosate exposure"],
        treatments: &["Chemotherapy", "Radiation therapy", "Stem cell transplant"],
        legal_options: &["Product liability lawsuit", "Mass tort participation"],
        settlements: "Roundup settlements have ranged from $5,000 to $250,000 per claimant.",
    },
    ArticleSeed {
        title: "3M Combat Arms Earplugs",
        description: "Defective military earplugs associated with hearing loss and tinnitus.",
        category: "Defective Products",
        overview: "Service members issued dual-ended Combat Arms Earplugs between 2003 and 2015 \
                   may have suffered hearing damage because the plugs loosened imperceptibly.",
        symptoms: &["Hearing loss", "Tinnitus", "Balance problems"],
        causes: &["Earplug design defect", "Noise exposure during service"],
        treatments: &["Hearing aids", "Sound therapy", "Cochlear implants"],
        legal_options: &["Product liability claim", "MDL settlement program"],
        settlements: "The 3M settlement program paid $10,000 to $100,000 or more depending on injury.",
    },
    ArticleSeed {
        title: "Camp Lejeune Water Contamination",
        description: "Toxic drinking water at a Marine Corps base linked to cancers and birth defects.",
        category: "Toxic Exposure",
        overview: "From 1953 to 1987 the water supply at Camp Lejeune was contaminated with industrial \
                   solvents and benzene, exposing service members, families and civilian workers.",
        symptoms: &["Kidney cancer", "Bladder cancer", "Parkinson's disease", "Leukemia"],
        causes: &["Contaminated base drinking water"],
        treatments: &["Oncology care", "Neurological treatment", "Dialysis"],
        legal_options: &["Camp Lejeune Justice Act claim", "Elective option settlement"],
        settlements: "Elective option payouts range from $100,000 to $550,000.",
    },
    ArticleSeed {
        title: "Hernia Mesh Complications",
        description: "Surgical mesh failures causing pain, infection and revision surgery.",
        category: "Medical Devices",
        overview: "Some hernia mesh products have been reported to migrate, shrink or perforate organs, \
                   leaving patients with chronic pain and repeat operations.",
        symptoms: &["Chronic pain", "Infection", "Bowel obstruction", "Mesh migration"],
        causes: &["Defective mesh materials", "Mesh adhesion"],
        treatments: &["Revision surgery", "Mesh removal", "Pain management"],
        legal_options: &["Product liability lawsuit", "Medical device MDL"],
        settlements: "Hernia mesh settlements typically range from $25,000 to $500,000.",
    },
];

/// Fallback injury articles
pub fn articles() -> Vec<Article> {
    ARTICLES
        .iter()
        .enumerate()
        .map(|(index, seed)| Article {
            id: fallback_id(index),
            source: Source::Fallback,
            title: seed.title.to_string(),
            description: seed.description.to_string(),
            slug: create_slug(seed.title),
            category: seed.category.to_string(),
            content: ArticleContent {
                overview: seed.overview.to_string(),
                symptoms: strings(seed.symptoms),
                causes: strings(seed.causes),
                treatments: strings(seed.treatments),
                legal_options: strings(seed.legal_options),
                settlements: seed.settlements.to_string(),
            },
        })
        .collect()
}

/// Fallback law firm directory
pub fn law_firms() -> Vec<LawFirm> {
    let firms: [(&str, &str, &str, &[&str], &str, &str, &[&str]); 4] = [
        (
            "Pacific Asbestos Law Group",
            "Los Angeles, California",
            "(800) 555-0142",
            &["Mesothelioma", "Asbestos Exposure", "Lung Cancer"],
            "30+ years",
            "96%",
            &["$12.5M mesothelioma verdict", "$4.2M shipyard exposure settlement"],
        ),
        (
            "Lone Star Injury Attorneys",
            "Houston, Texas",
            "(800) 555-0187",
            &["Roundup", "Hernia Mesh", "Product Liability"],
            "22 years",
            "91%",
            &["$2.1M hernia mesh settlement"],
        ),
        (
            "Carolina Veterans Legal",
            "Jacksonville, North Carolina",
            "(800) 555-0133",
            &["Camp Lejeune", "3M Earplugs", "Military Injury"],
            "18 years",
            "93%",
            &["$750K Camp Lejeune claim", "$310K earplug settlement"],
        ),
        (
            "Empire Mass Tort Partners",
            "New York, New York",
            "(800) 555-0164",
            &["Mesothelioma", "Roundup", "Hernia Mesh"],
            "25 years",
            "89%",
            &["$8M asbestos trust recovery"],
        ),
    ];

    firms
        .iter()
        .enumerate()
        .map(
            |(index, (name, location, phone, specialties, experience, success_rate, notable))| {
                LawFirm {
                    id: fallback_id(index),
                    source: Source::Fallback,
                    name: name.to_string(),
                    location: location.to_string(),
                    phone: phone.to_string(),
                    specialties: strings(specialties),
                    experience: experience.to_string(),
                    success_rate: success_rate.to_string(),
                    notable_settlements: strings(notable),
                }
            },
        )
        .collect()
}

/// Fallback settlement statistics
pub fn settlements() -> Vec<SettlementRecord> {
    let rows: [(&str, &str, &str, &str, u32, i32); 6] = [
        ("Mesothelioma", "California", "$1M - $5M", "$2.4M", 1250, 2024),
        ("Mesothelioma", "Texas", "$800K - $3M", "$1.6M", 980, 2024),
        ("Roundup", "California", "$5K - $250K", "$110K", 4100, 2023),
        ("3M Combat Arms Earplugs", "Florida", "$10K - $100K", "$24K", 249000, 2023),
        ("Camp Lejeune", "North Carolina", "$100K - $550K", "$275K", 1800, 2024),
        ("Hernia Mesh", "Ohio", "$25K - $500K", "$60K", 3300, 2023),
    ];

    rows.iter()
        .enumerate()
        .map(|(index, (condition, state, range, average, cases, year))| SettlementRecord {
            id: fallback_id(index),
            source: Source::Fallback,
            condition: condition.to_string(),
            state: state.to_string(),
            settlement_range: Some(range.to_string()),
            average_settlement: Some(average.to_string()),
            total_cases: Some(*cases),
            year: Some(*year),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_kind_is_non_empty_and_fallback_tagged() {
        for kind in [RecordKind::Article, RecordKind::LawFirm, RecordKind::Settlement] {
            let data = dataset(kind);
            assert_eq!(data.kind(), kind);
            assert!(!data.is_empty());
            assert!(data.is_fallback());
        }
    }

    #[test]
    fn test_ids_are_unique_per_kind() {
        let ids: HashSet<String> = articles().into_iter().map(|a| a.id).collect();
        assert_eq!(ids.len(), ARTICLES.len());
        assert!(ids.contains("fallback_1"));
    }

    #[test]
    fn test_article_slugs() {
        let slugs: Vec<String> = articles().into_iter().map(|a| a.slug).collect();
        assert!(slugs.contains(&"3m-combat-arms-earplugs".to_string()));
        assert!(slugs.contains(&"mesothelioma".to_string()));
    }

    #[test]
    fn test_settlements_narrowed_by_condition() {
        let narrowed = settlements_for(Some("mesothelioma")).into_settlements();
        assert_eq!(narrowed.len(), 2);
        assert!(narrowed.iter().all(|s| s.condition == "Mesothelioma"));
    }

    #[test]
    fn test_unmatched_condition_returns_everything() {
        assert_eq!(settlements_for(Some("whiplash")).len(), settlements().len());
        assert_eq!(settlements_for(None).len(), settlements().len());
        assert_eq!(settlements_for(Some("  ")).len(), settlements().len());
    }

    #[test]
    fn test_california_mesothelioma_firm_exists() {
        let firms = law_firms();
        assert!(firms
            .iter()
            .any(|f| f.has_specialty("mesothelioma") && f.is_located_in("California")));
    }
}

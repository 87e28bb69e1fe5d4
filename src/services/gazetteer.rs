//! Built-in gazetteer shared by the offline linker and recognizer.
//!
//! Each entry maps a surface form to a knowledge-base resource name and a
//! coarse kind. Surface forms are matched case-sensitively on word
//! boundaries, longest form first.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

/// Base URI for resource names.
pub const DBPEDIA_RESOURCE_PREFIX: &str = "http://dbpedia.org/resource/";

/// Coarse kind of a gazetteer entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Person,
    City,
    Country,
    Region,
    Organization,
    /// Nationalities, events and other proper-noun entities.
    Misc,
    /// Common-noun concepts; linkable but never a named entity.
    Concept,
}

impl EntryKind {
    /// Label in the recognizer's (CoNLL-style) tag set.
    pub fn ner_label(&self) -> Option<&'static str> {
        match self {
            EntryKind::Person => Some("PERSON"),
            EntryKind::City | EntryKind::Country | EntryKind::Region => Some("LOCATION"),
            EntryKind::Organization => Some("ORGANIZATION"),
            EntryKind::Misc => Some("MISC"),
            EntryKind::Concept => None,
        }
    }

    /// Comma-separated ontology types in the entity-linking service's format.
    pub fn ontology_types(&self) -> &'static str {
        match self {
            EntryKind::Person => {
                "DBpedia:Agent,Schema:Person,Http://xmlns.com/foaf/0.1/Person,DBpedia:Person"
            }
            EntryKind::City => {
                "Schema:Place,DBpedia:Place,DBpedia:PopulatedPlace,DBpedia:Settlement,Schema:City,DBpedia:City"
            }
            EntryKind::Country => {
                "Schema:Place,DBpedia:Place,DBpedia:PopulatedPlace,Schema:Country,DBpedia:Country"
            }
            EntryKind::Region => "Schema:Place,DBpedia:Place,DBpedia:PopulatedPlace",
            EntryKind::Organization => "Schema:Organization,DBpedia:Agent,DBpedia:Organisation",
            EntryKind::Misc | EntryKind::Concept => "",
        }
    }
}

/// A single gazetteer entry.
#[derive(Debug, Clone, Copy)]
pub struct Entry {
    pub surface: &'static str,
    pub kind: EntryKind,
    pub resource: &'static str,
}

impl Entry {
    pub fn uri(&self) -> String {
        format!("{}{}", DBPEDIA_RESOURCE_PREFIX, self.resource)
    }

    /// Full names are multi-word; single-token aliases are less certain.
    pub fn is_full_name(&self) -> bool {
        self.surface.contains(' ')
    }
}

const fn entry(surface: &'static str, kind: EntryKind, resource: &'static str) -> Entry {
    Entry {
        surface,
        kind,
        resource,
    }
}

use EntryKind::*;

static ENTRIES: &[Entry] = &[
    // People
    entry("Barack Obama", Person, "Barack_Obama"),
    entry("Obama", Person, "Barack_Obama"),
    entry("Angela Merkel", Person, "Angela_Merkel"),
    entry("Merkel", Person, "Angela_Merkel"),
    entry("Vladimir Putin", Person, "Vladimir_Putin"),
    entry("Putin", Person, "Vladimir_Putin"),
    entry("Donald Trump", Person, "Donald_Trump"),
    entry("Trump", Person, "Donald_Trump"),
    entry("Emmanuel Macron", Person, "Emmanuel_Macron"),
    entry("Macron", Person, "Emmanuel_Macron"),
    entry("François Hollande", Person, "François_Hollande"),
    entry("Hollande", Person, "François_Hollande"),
    entry("David Cameron", Person, "David_Cameron"),
    entry("Theresa May", Person, "Theresa_May"),
    entry("Xi Jinping", Person, "Xi_Jinping"),
    entry("Hillary Clinton", Person, "Hillary_Clinton"),
    entry("Ban Ki-moon", Person, "Ban_Ki-moon"),
    entry("John Kennedy", Person, "John_F._Kennedy"),
    entry("Pope Francis", Person, "Pope_Francis"),
    // Cities
    entry("Berlin", City, "Berlin"),
    entry("Paris", City, "Paris"),
    entry("London", City, "London"),
    entry("Moscow", City, "Moscow"),
    entry("Washington", City, "Washington,_D.C."),
    entry("New York", City, "New_York_City"),
    entry("Brussels", City, "Brussels"),
    entry("Bonn", City, "Bonn"),
    entry("Madrid", City, "Madrid"),
    entry("Barcelona", City, "Barcelona"),
    entry("Rome", City, "Rome"),
    entry("Beijing", City, "Beijing"),
    entry("Tokyo", City, "Tokyo"),
    entry("Geneva", City, "Geneva"),
    entry("Vienna", City, "Vienna"),
    entry("Kiev", City, "Kiev"),
    entry("Damascus", City, "Damascus"),
    // Countries
    entry("Germany", Country, "Germany"),
    entry("France", Country, "France"),
    entry("Spain", Country, "Spain"),
    entry("Italy", Country, "Italy"),
    entry("Russia", Country, "Russia"),
    entry("China", Country, "China"),
    entry("Japan", Country, "Japan"),
    entry("Syria", Country, "Syria"),
    entry("Ukraine", Country, "Ukraine"),
    entry("Greece", Country, "Greece"),
    entry("United States", Country, "United_States"),
    entry("United Kingdom", Country, "United_Kingdom"),
    // Regions
    entry("Europe", Region, "Europe"),
    entry("Africa", Region, "Africa"),
    entry("Asia", Region, "Asia"),
    entry("Middle East", Region, "Middle_East"),
    entry("Catalonia", Region, "Catalonia"),
    entry("Bavaria", Region, "Bavaria"),
    // Organizations
    entry("United Nations", Organization, "United_Nations"),
    entry("European Union", Organization, "European_Union"),
    entry("NATO", Organization, "NATO"),
    entry("Bundestag", Organization, "Bundestag"),
    entry("Deutsche Welle", Organization, "Deutsche_Welle"),
    entry("FireEye", Organization, "FireEye"),
    entry("Mandiant", Organization, "Mandiant"),
    entry("Google", Organization, "Google"),
    entry("Microsoft", Organization, "Microsoft"),
    entry("Facebook", Organization, "Facebook"),
    entry("FBI", Organization, "Federal_Bureau_of_Investigation"),
    entry("CIA", Organization, "Central_Intelligence_Agency"),
    entry("Metasploit", Organization, "Metasploit_Project"),
    // Misc
    entry("German", Misc, "Germans"),
    entry("French", Misc, "French_people"),
    entry("American", Misc, "Americans"),
    entry("European", Misc, "Europeans"),
    entry("Russian", Misc, "Russians"),
    entry("Olympic Games", Misc, "Olympic_Games"),
    // Concepts
    entry("credit card", Concept, "Credit_card"),
    entry("credit cards", Concept, "Credit_card"),
    entry("malware", Concept, "Malware"),
    entry("hacker", Concept, "Security_hacker"),
    entry("password", Concept, "Password"),
    entry("refugees", Concept, "Refugee"),
    entry("election", Concept, "Election"),
];

static BY_SURFACE: LazyLock<HashMap<&'static str, &'static Entry>> =
    LazyLock::new(|| ENTRIES.iter().map(|e| (e.surface, e)).collect());

static SURFACE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    let mut surfaces: Vec<&str> = ENTRIES.iter().map(|e| e.surface).collect();
    // Alternation is leftmost-first, so longer forms must come first.
    surfaces.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
    let alternation = surfaces
        .iter()
        .map(|s| regex::escape(s))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"\b(?:{})\b", alternation)).expect("gazetteer pattern should compile")
});

/// A gazetteer entry found in text, with byte offsets.
#[derive(Debug, Clone, Copy)]
pub struct GazetteerMatch {
    pub start: usize,
    pub end: usize,
    pub entry: &'static Entry,
}

/// All non-overlapping gazetteer matches in `text`, left to right.
pub fn find_all(text: &str) -> Vec<GazetteerMatch> {
    SURFACE_PATTERN
        .find_iter(text)
        .filter_map(|m| {
            BY_SURFACE.get(m.as_str()).map(|entry| GazetteerMatch {
                start: m.start(),
                end: m.end(),
                entry,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finds_longest_form() {
        let matches = find_all("Barack Obama met Obama fans in New York.");
        let found: Vec<&str> = matches.iter().map(|m| m.entry.surface).collect();
        assert_eq!(found, vec!["Barack Obama", "Obama", "New York"]);
        assert_eq!(matches[0].entry.resource, "Barack_Obama");
    }

    #[test]
    fn test_word_boundaries() {
        assert!(find_all("Parisian cafes and Germanic tribes").is_empty());
    }

    #[test]
    fn test_case_sensitive() {
        let found: Vec<&str> = find_all("Malware and malware")
            .iter()
            .map(|m| m.entry.surface)
            .collect();
        assert_eq!(found, vec!["malware"]);
    }

    #[test]
    fn test_match_entry_and_uri() {
        let matches = find_all("From Berlin to Atlantis.");
        assert_eq!(matches.len(), 1);
        let berlin = matches[0].entry;
        assert_eq!(berlin.kind, EntryKind::City);
        assert_eq!(berlin.uri(), "http://dbpedia.org/resource/Berlin");
        assert!(!berlin.is_full_name());
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(EntryKind::City.ner_label(), Some("LOCATION"));
        assert_eq!(EntryKind::Concept.ner_label(), None);
        assert!(EntryKind::City.ontology_types().contains("City"));
        assert!(EntryKind::Organization
            .ontology_types()
            .contains("Organisation"));
    }
}

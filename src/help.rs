//! Text printed for `--help_on <datatype>`.

use crate::config::DatatypeRegistry;
use crate::constants::{COMMON_OPTIONS, CONFIG_SECTION_KEY, DEFAULT_EXTRACTOR_PROGRAM};

fn general_info() -> String {
    format!(
        "sim2sumo extracts tables from simulator runs with {program} and uploads them with metadata.\n\
         Everything is configured under the '{key}' key of the global variables file:\n\
         \x20 * datafile: a path, a list, a mapping of path to datatypes, or absent (discover */model/*)\n\
         \x20 * datatypes: a name, a list of names or 'all' (default: registry defaults)\n\
         \x20 * options: shared options, or per datatype as <datatype>: {{option: value}}\n\
         \x20 * rstprops: restart properties exported with grid\n\
         \x20 * grid3d: true/false to switch grid on or off\n",
        program = DEFAULT_EXTRACTOR_PROGRAM,
        key = CONFIG_SECTION_KEY
    )
}

/// Help for one datatype, or the general text when `topic` is `None`
pub fn give_help(registry: &DatatypeRegistry, topic: Option<&str>) -> String {
    let mut text = general_info();
    let Some(topic) = topic else {
        return text;
    };

    match registry.lookup(topic.trim()) {
        Ok(datatype) => {
            let entry = registry.entry(datatype);
            text.push_str(&format!("\n{}: {}\n", datatype, entry.description));
            text.push_str(&format!("  content: {}\n", entry.content));
            text.push_str(&format!(
                "  extracted by default: {}\n",
                if entry.enabled_by_default { "yes" } else { "no" }
            ));
            let mut options: Vec<&str> = entry.accepted_options.to_vec();
            options.extend_from_slice(COMMON_OPTIONS);
            text.push_str(&format!("  options: {}\n", options.join(", ")));

            let defaults = registry.default_options(datatype);
            for (key, value) in defaults.iter() {
                let rendered = serde_yaml::to_string(value).unwrap_or_default();
                text.push_str(&format!("  default {}: {}\n", key, rendered.trim().replace('\n', " ")));
            }
        }
        Err(_) => {
            text.push_str(&format!(
                "\ndatatype '{}' does not exist, existing options:\n{}\n",
                topic,
                registry.supported_names().join("\n")
            ));
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_general_only() {
        let registry = DatatypeRegistry::standard();
        let text = give_help(&registry, None);
        assert!(text.contains("sim2sumo"));
        assert!(text.contains("datatypes"));
    }

    #[test]
    fn test_known_datatype() {
        let registry = DatatypeRegistry::standard();
        let text = give_help(&registry, Some("grid"));
        assert!(text.contains("grid: Grid geometry"));
        assert!(text.contains("rstprops"));
        assert!(text.contains("SWAT"));
        assert!(text.contains("extracted by default: no"));

        let satfunc = give_help(&registry, Some("satfunc"));
        assert!(satfunc.contains("extracted by default: yes"));
    }

    #[test]
    fn test_unknown_datatype_lists_options() {
        let registry = DatatypeRegistry::standard();
        let text = give_help(&registry, Some("banana"));
        assert!(text.contains("'banana' does not exist"));
        assert!(text.contains("wellconnstatus"));
    }
}

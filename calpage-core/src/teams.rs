//! Team registry used to cross-reference events against schedule data.
//!
//! Match events are titled with full team names ("Austin FC vs FC Cincinnati")
//! while schedule slugs and style hooks use short abbreviations. The registry
//! owns that mapping plus each team's brand color.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{CalPageError, CalPageResult};

/// Placeholder abbreviation for opponents missing from the registry.
pub const UNKNOWN_TEAM_ABBR: &str = "-";

/// The club the page is built around, as configured in settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Club {
    pub name: String,
    pub abbr: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Team {
    pub abbr: String,
    pub name: String,
    pub color: String,
}

/// Team entry as it appears in settings, keyed there by abbreviation.
#[derive(Debug, Clone, Deserialize)]
pub struct TeamConfig {
    pub name: String,
    pub color: String,
}

/// League opponents shipped as the default table. Settings may replace it.
const BUILTIN_TEAMS: &[(&str, &str, &str)] = &[
    ("atl", "Atlanta United", "#9d2235"),
    ("cin", "FC Cincinnati", "#003087"),
    ("clt", "Charlotte FC", "#0085ca"),
    ("col", "Colorado Rapids", "#8a2432"),
    ("dal", "FC Dallas", "#c6093b"),
    ("dc", "D.C. United", "#212121"),
    ("hou", "Houston Dynamo FC", "#101820"),
    ("la", "LA Galaxy", "#004b87"),
    ("lafc", "LAFC", "#212121"),
    ("mia", "Inter Miami CF", "#212322"),
    ("min", "Minnesota United", "#737b82"),
    ("mtl", "CF Montréal", "#212121"),
    ("nsh", "Nashville SC", "#201547"),
    ("orl", "Orlando City", "#61259e"),
    ("por", "Portland Timbers", "#004812"),
    ("rbny", "New York Red Bulls", "#ba0c2f"),
    ("rsl", "Real Salt Lake", "#001e61"),
    ("sea", "Seattle Sounders FC", "#64a608"),
    ("sj", "San Jose Earthquakes", "#0051ba"),
    ("skc", "Sporting Kansas City", "#0c2340"),
    ("van", "Vancouver Whitecaps FC", "#002244"),
];

/// Immutable lookup table over the configured teams.
#[derive(Debug, Clone)]
pub struct TeamRegistry {
    teams: Vec<Team>,
}

impl TeamRegistry {
    pub fn builtin() -> Self {
        TeamRegistry {
            teams: BUILTIN_TEAMS
                .iter()
                .map(|(abbr, name, color)| Team {
                    abbr: abbr.to_string(),
                    name: name.to_string(),
                    color: color.to_string(),
                })
                .collect(),
        }
    }

    /// Build the registry from the settings table, or fall back to the
    /// built-in one when settings carry no `teams` key.
    pub fn from_settings(configured: Option<&HashMap<String, TeamConfig>>) -> CalPageResult<Self> {
        let Some(configured) = configured else {
            return Ok(Self::builtin());
        };

        let mut abbrs: Vec<&String> = configured.keys().collect();
        abbrs.sort();

        let teams = abbrs
            .into_iter()
            .map(|abbr| {
                let entry = &configured[abbr];
                Team {
                    abbr: abbr.to_lowercase(),
                    name: entry.name.clone(),
                    color: entry.color.clone(),
                }
            })
            .collect();

        let registry = TeamRegistry { teams };
        registry.validate()?;
        Ok(registry)
    }

    // Name -> abbr must be a function for slug generation to be well-defined.
    fn validate(&self) -> CalPageResult<()> {
        for (i, team) in self.teams.iter().enumerate() {
            if let Some(duplicate) = self.teams[i + 1..]
                .iter()
                .find(|other| other.name.eq_ignore_ascii_case(&team.name))
            {
                return Err(CalPageError::Config(format!(
                    "teams '{}' and '{}' share the full name '{}'",
                    team.abbr, duplicate.abbr, team.name
                )));
            }
        }
        Ok(())
    }

    /// Resolve a full team name (case-insensitive) to its abbreviation.
    pub fn abbr_for(&self, full_name: &str) -> Option<&str> {
        self.teams
            .iter()
            .find(|team| team.name.eq_ignore_ascii_case(full_name))
            .map(|team| team.abbr.as_str())
    }

    pub fn by_abbr(&self, abbr: &str) -> Option<&Team> {
        self.teams
            .iter()
            .find(|team| team.abbr.eq_ignore_ascii_case(abbr))
    }

    /// Brand colors keyed by abbreviation, ordered for stable output.
    pub fn colors_by_abbr(&self) -> BTreeMap<String, String> {
        self.teams
            .iter()
            .map(|team| (team.abbr.clone(), team.color.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }
}

impl Default for TeamRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

//! Character sheet parsing from a new issue's body.
//!
//! The issue template has three sections:
//!
//! ```text
//! ## Character Name
//! Aria
//! ## Class
//! - [ ] Warrior
//! - [x] Archer
//! ## Optional Backstory
//! Raised by eagles.
//! ```
//!
//! Lines starting with `(` are template hints and are skipped.

use crate::world::PlayerClass;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CharacterSheet {
    pub name: Option<String>,
    pub class: Option<PlayerClass>,
    pub backstory: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Name,
    Class,
    Backstory,
}

fn heading(line: &str) -> Option<Section> {
    let title = line.strip_prefix("##")?.trim_start().to_ascii_lowercase();
    if title.starts_with("character name") {
        Some(Section::Name)
    } else if title.starts_with("class") {
        Some(Section::Class)
    } else if title.starts_with("optional backstory") {
        Some(Section::Backstory)
    } else {
        None
    }
}

/// `- [x] Archer` → `Archer`
fn checked_item(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("- [")?;
    let rest = rest
        .strip_prefix("x] ")
        .or_else(|| rest.strip_prefix("X] "))?;
    Some(rest.trim())
}

fn is_content(line: &str) -> bool {
    !line.is_empty() && !line.starts_with('(') && !line.starts_with("##")
}

pub fn parse_character_sheet(body: &str) -> CharacterSheet {
    let mut sheet = CharacterSheet::default();
    let mut section = Section::None;
    let mut backstory: Vec<&str> = Vec::new();

    for line in body.lines().map(str::trim) {
        if let Some(next) = heading(line) {
            section = next;
            continue;
        }
        match section {
            // The last non-hint line wins
            Section::Name if is_content(line) => sheet.name = Some(line.to_string()),
            // The first checked valid class wins
            Section::Class if sheet.class.is_none() => {
                sheet.class = checked_item(line).and_then(PlayerClass::from_name);
            }
            Section::Backstory if is_content(line) => backstory.push(line),
            _ => {}
        }
    }

    if !backstory.is_empty() {
        sheet.backstory = Some(backstory.join("\n"));
    }
    sheet
}

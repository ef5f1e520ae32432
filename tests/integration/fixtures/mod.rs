// Rider documents with known expanded and formatted outputs

#![allow(dead_code)]

/// Dictionary used with RIDER_TEXT
pub const RIDER_DICTIONARY: &[(&str, &str)] = &[
    ("mt", "metric ton"),
    ("w.o.g.", "without guarantee"),
    ("cp", "charter party"),
    ("chopt", "charterers' option"),
    ("shinc", "sundays and holidays included"),
    ("abt", "about"),
];

/// Rider with sequential clauses, a split title and a stray numbered prose line
pub const RIDER_TEXT: &str = "29. Vessel
Vessel of about 50000 mt dwcc. w.o.g. Charterers to pay freight.

30. Laytime
Cargo to be loaded at 5000mt per weather working day shinc.
31. Demurrage
Demurrage as per cp, payable by owners/charterers and / or their agents.
32 - where and when required by the master
99. Unrelated prose sentence with many words describing something entirely different and long
33. deleted";

/// Expand mode output for RIDER_TEXT
pub const RIDER_EXPANDED: &str = "29. Vessel
Vessel of about 50000 metric ton dwcc. Without guarantee. Charterers to pay freight.

30. Laytime
Cargo to be loaded at 5000 metric ton per weather working day sundays and holidays included.
31. Demurrage
Demurrage as per charter party, payable by owners / charterers and/or their agents.
32 - where and when required by the master
99. Unrelated prose sentence with many words describing something entirely different and long
33. Deleted";

/// Format mode paragraph texts for RIDER_TEXT
pub const RIDER_PARAGRAPHS: &[&str] = &[
    "CLAUSE 29. VESSEL",
    "Vessel of about 50000 metric ton dwcc. Without guarantee. Charterers to pay freight.",
    "CLAUSE 30. LAYTIME",
    "Cargo to be loaded at 5000 metric ton per weather working day sundays and holidays included.",
    "CLAUSE 31. DEMURRAGE",
    "Demurrage as per charter party, payable by owners / charterers and/or their agents.",
    "CLAUSE 32",
    "where and when required by the master",
    "99. Unrelated prose sentence with many words describing something entirely different and long",
    "CLAUSE 33. DELETED",
];

pub const RIDER_EXPANSIONS: usize = 5;
pub const RIDER_SLASH_NORMALIZATIONS: usize = 2;
pub const RIDER_HEADINGS: usize = 5;

//! Builders for synthetic combat log lines used across the test suites.

use chrono::DateTime;

use crate::combat_log::{LogLine, parse_log_line};

pub const YEAR: i32 = 2021;

/// 8/20/2021 22:13:20.000 UTC
pub const T0: i64 = 1_629_497_480_000;

pub struct TestUnit {
    pub id: &'static str,
    pub name: &'static str,
    pub flags: &'static str,
    pub owner: &'static str,
}

pub const ALLY_1: TestUnit = TestUnit {
    id: "Player-57-0CE7FCBF",
    name: "Assinoth-Whitemane",
    flags: "0x511",
    owner: "0000000000000000",
};

pub const ALLY_2: TestUnit = TestUnit {
    id: "Player-57-0B1A2C3D",
    name: "Wuzzle-Azshara",
    flags: "0x511",
    owner: "0000000000000000",
};

pub const ENEMY_1: TestUnit = TestUnit {
    id: "Player-1084-09FC4747",
    name: "Acedin-TarrenMill",
    flags: "0x548",
    owner: "0000000000000000",
};

pub const ENEMY_2: TestUnit = TestUnit {
    id: "Player-1084-0A11B22C",
    name: "Darshath-Kirtonos",
    flags: "0x548",
    owner: "0000000000000000",
};

/// Pet owned by `ALLY_2`.
pub const ALLY_PET: TestUnit = TestUnit {
    id: "Pet-0-4390-572-19853-17252-01004BFD4E",
    name: "Jhuuthun",
    flags: "0x1111",
    owner: "Player-57-0B1A2C3D",
};

/// `M/D HH:MM:SS.mmm` for a millisecond timestamp.
pub fn stamp(ts: i64) -> String {
    DateTime::from_timestamp_millis(ts)
        .expect("timestamp in range")
        .format("%-m/%-d %H:%M:%S%.3f")
        .to_string()
}

pub fn tokenize(raw: &str) -> LogLine {
    parse_log_line(raw, YEAR).expect("test line should tokenize")
}

pub fn unit_fields(u: &TestUnit) -> String {
    format!("{},\"{}\",{},0x0", u.id, u.name, u.flags)
}

fn advanced_block(u: &TestUnit) -> String {
    format!(
        "{},{},30000,40000,0,0,1200,0,0,45000,50000,0,-2042.5,1530.25,1505,3.1416,60",
        u.id, u.owner
    )
}

pub fn match_start(ts: i64) -> String {
    format!("{}  ARENA_MATCH_START,1552,30,2v2,1", stamp(ts))
}

pub fn match_end(ts: i64, winner: u8) -> String {
    format!("{}  ARENA_MATCH_END,{},465,1440,1437", stamp(ts), winner)
}

pub fn combatant_info_line(ts: i64, u: &TestUnit, team: u8, spec: u32) -> String {
    format!(
        "{}  COMBATANT_INFO,{},{},450,1500,2100,900,0,0,0,600,600,600,0,0,300,300,300,0,500,200,200,100,1200,{},\
         (0,0,0,0,0,0,0),(3531,5475,3537,5465),[7,1,(1,2),[(3,4)],[(1,2),(3,4)]],\
         [(178692,226,(),(7101,6652),()),(178745,233,(6222),(),(173128))],[{},21562],0,0,1450,3",
        stamp(ts),
        u.id,
        team,
        spec,
        u.id
    )
}

pub fn spell_damage(ts: i64, src: &TestUnit, dest: &TestUnit, amount: i64) -> String {
    format!(
        "{}  SPELL_DAMAGE,{},{},585,\"Smite\",0x2,{},{},{},-1,2,0,0,0,nil,nil,nil",
        stamp(ts),
        unit_fields(src),
        unit_fields(dest),
        advanced_block(src),
        amount,
        amount
    )
}

pub fn swing_damage(ts: i64, src: &TestUnit, dest: &TestUnit, amount: i64) -> String {
    format!(
        "{}  SWING_DAMAGE,{},{},{},{},{},-1,1,0,0,0,nil,nil,nil",
        stamp(ts),
        unit_fields(src),
        unit_fields(dest),
        advanced_block(src),
        amount,
        amount
    )
}

pub fn spell_heal(ts: i64, src: &TestUnit, dest: &TestUnit, amount: i64) -> String {
    format!(
        "{}  SPELL_HEAL,{},{},2061,\"Flash Heal\",0x2,{},{},{},0,0,nil",
        stamp(ts),
        unit_fields(src),
        unit_fields(dest),
        advanced_block(src),
        amount,
        amount
    )
}

pub fn unit_died(ts: i64, u: &TestUnit, unconscious: bool) -> String {
    format!(
        "{}  UNIT_DIED,0000000000000000,nil,0x80000000,0x80000000,{},{}",
        stamp(ts),
        unit_fields(u),
        u8::from(unconscious)
    )
}

pub fn summon(ts: i64, owner: &TestUnit, pet: &TestUnit) -> String {
    format!(
        "{}  SPELL_SUMMON,{},{},883,\"Call Pet 1\",0x1",
        stamp(ts),
        unit_fields(owner),
        unit_fields(pet)
    )
}

/// A complete 2v2 arena: both teams trade blows for eight seconds, `ENEMY_2`
/// dies, then the match ends with `winner` as the winning team. The allies
/// are team 1.
pub fn scenario(t0: i64, winner: u8) -> Vec<String> {
    let mut lines = vec![
        match_start(t0),
        combatant_info_line(t0 + 100, &ALLY_1, 1, 256),
        combatant_info_line(t0 + 100, &ALLY_2, 1, 71),
        combatant_info_line(t0 + 100, &ENEMY_1, 0, 577),
        combatant_info_line(t0 + 100, &ENEMY_2, 0, 63),
    ];
    for round in 0..8 {
        let ts = t0 + 1000 + round * 1000;
        lines.push(spell_damage(ts, &ALLY_1, &ENEMY_1, 1000 + round));
        lines.push(swing_damage(ts + 100, &ALLY_2, &ENEMY_2, 800 + round));
        lines.push(spell_damage(ts + 200, &ENEMY_1, &ALLY_2, 900 + round));
        lines.push(spell_heal(ts + 300, &ENEMY_2, &ENEMY_1, 500 + round));
    }
    lines.push(unit_died(t0 + 10_000, &ENEMY_2, false));
    lines.push(match_end(t0 + 11_000, winner));
    lines
}

/*
 * SPDX-FileCopyrightText: Copyright (c) 2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
 * SPDX-License-Identifier: Apache-2.0
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 * http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

//! Mapping of Redfish enumerations to the numeric codes exported as gauge values.
//!
//! Codes are consumed by dashboards and must never be reassigned. Unknown or
//! empty values map to `None` and the sample is not emitted.

/// One closed family of Redfish enumeration values.
pub trait StatusFamily: Sized + Copy + 'static {
    const ALL: &'static [Self];

    fn parse(value: &str) -> Option<Self>;

    fn as_str(self) -> &'static str;

    fn code(self) -> u8;

    /// Code of an optional remote value.
    fn value_of(value: Option<&str>) -> Option<f64> {
        value.and_then(Self::parse).map(|v| f64::from(v.code()))
    }

    /// `1(OK),2(Warning),3(Critical)` style legend for help texts.
    fn legend() -> String {
        Self::ALL
            .iter()
            .map(|v| format!("{}({})", v.code(), v.as_str()))
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Health {
    Ok,
    Warning,
    Critical,
}

impl StatusFamily for Health {
    const ALL: &'static [Self] = &[Self::Ok, Self::Warning, Self::Critical];

    fn parse(value: &str) -> Option<Self> {
        match value {
            "OK" => Some(Self::Ok),
            "Warning" => Some(Self::Warning),
            "Critical" => Some(Self::Critical),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Warning => "Warning",
            Self::Critical => "Critical",
        }
    }

    fn code(self) -> u8 {
        match self {
            Self::Ok => 1,
            Self::Warning => 2,
            Self::Critical => 3,
        }
    }
}

/// Log entry severity, same values and codes as [`Health`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Ok,
    Warning,
    Critical,
}

impl StatusFamily for Severity {
    const ALL: &'static [Self] = &[Self::Ok, Self::Warning, Self::Critical];

    fn parse(value: &str) -> Option<Self> {
        match value {
            "OK" => Some(Self::Ok),
            "Warning" => Some(Self::Warning),
            "Critical" => Some(Self::Critical),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Warning => "Warning",
            Self::Critical => "Critical",
        }
    }

    fn code(self) -> u8 {
        match self {
            Self::Ok => 1,
            Self::Warning => 2,
            Self::Critical => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Enabled,
    Disabled,
    StandbyOffline,
    StandbySpare,
    InTest,
    Starting,
    Absent,
    UnavailableOffline,
    Deferring,
    Quiesced,
    Updating,
}

impl StatusFamily for State {
    const ALL: &'static [Self] = &[
        Self::Enabled,
        Self::Disabled,
        Self::StandbyOffline,
        Self::StandbySpare,
        Self::InTest,
        Self::Starting,
        Self::Absent,
        Self::UnavailableOffline,
        Self::Deferring,
        Self::Quiesced,
        Self::Updating,
    ];

    fn parse(value: &str) -> Option<Self> {
        match value {
            "Enabled" => Some(Self::Enabled),
            "Disabled" => Some(Self::Disabled),
            "StandbyOffline" => Some(Self::StandbyOffline),
            "StandbySpare" => Some(Self::StandbySpare),
            "InTest" => Some(Self::InTest),
            "Starting" => Some(Self::Starting),
            "Absent" => Some(Self::Absent),
            "UnavailableOffline" => Some(Self::UnavailableOffline),
            "Deferring" => Some(Self::Deferring),
            "Quiesced" => Some(Self::Quiesced),
            "Updating" => Some(Self::Updating),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Enabled => "Enabled",
            Self::Disabled => "Disabled",
            Self::StandbyOffline => "StandbyOffline",
            Self::StandbySpare => "StandbySpare",
            Self::InTest => "InTest",
            Self::Starting => "Starting",
            Self::Absent => "Absent",
            Self::UnavailableOffline => "UnavailableOffline",
            Self::Deferring => "Deferring",
            Self::Quiesced => "Quiesced",
            Self::Updating => "Updating",
        }
    }

    fn code(self) -> u8 {
        match self {
            Self::Enabled => 1,
            Self::Disabled => 2,
            Self::StandbyOffline => 3,
            Self::StandbySpare => 4,
            Self::InTest => 5,
            Self::Starting => 6,
            Self::Absent => 7,
            Self::UnavailableOffline => 8,
            Self::Deferring => 9,
            Self::Quiesced => 10,
            Self::Updating => 11,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerState {
    On,
    Off,
    PoweringOn,
    PoweringOff,
}

impl StatusFamily for PowerState {
    const ALL: &'static [Self] = &[Self::On, Self::Off, Self::PoweringOn, Self::PoweringOff];

    fn parse(value: &str) -> Option<Self> {
        match value {
            "On" => Some(Self::On),
            "Off" => Some(Self::Off),
            "PoweringOn" => Some(Self::PoweringOn),
            "PoweringOff" => Some(Self::PoweringOff),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::On => "On",
            Self::Off => "Off",
            Self::PoweringOn => "PoweringOn",
            Self::PoweringOff => "PoweringOff",
        }
    }

    fn code(self) -> u8 {
        match self {
            Self::On => 1,
            Self::Off => 2,
            Self::PoweringOn => 3,
            Self::PoweringOff => 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_round_trips<F: StatusFamily + std::fmt::Debug + PartialEq>() {
        for value in F::ALL {
            assert_eq!(F::parse(value.as_str()), Some(*value));
        }
    }

    #[test]
    fn test_published_codes() {
        assert_eq!(Health::value_of(Some("OK")), Some(1.0));
        assert_eq!(Health::value_of(Some("Warning")), Some(2.0));
        assert_eq!(Health::value_of(Some("Critical")), Some(3.0));

        assert_eq!(Severity::value_of(Some("Warning")), Some(2.0));

        assert_eq!(State::value_of(Some("Enabled")), Some(1.0));
        assert_eq!(State::value_of(Some("Absent")), Some(7.0));
        assert_eq!(State::value_of(Some("Updating")), Some(11.0));

        assert_eq!(PowerState::value_of(Some("On")), Some(1.0));
        assert_eq!(PowerState::value_of(Some("PoweringOff")), Some(4.0));
    }

    #[test]
    fn test_codes_follow_declaration_order() {
        fn codes<F: StatusFamily>() -> Vec<u8> {
            F::ALL.iter().map(|v| v.code()).collect()
        }
        assert_eq!(codes::<Health>(), vec![1, 2, 3]);
        assert_eq!(codes::<Severity>(), vec![1, 2, 3]);
        assert_eq!(codes::<State>(), (1..=11).collect::<Vec<_>>());
        assert_eq!(codes::<PowerState>(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_all_values_parse() {
        assert_round_trips::<Health>();
        assert_round_trips::<Severity>();
        assert_round_trips::<State>();
        assert_round_trips::<PowerState>();
    }

    #[test]
    fn test_unknown_values_are_absent() {
        for value in [None, Some(""), Some("ok"), Some("Unknown"), Some(" OK")] {
            assert_eq!(Health::value_of(value), None);
            assert_eq!(Severity::value_of(value), None);
            assert_eq!(State::value_of(value), None);
            assert_eq!(PowerState::value_of(value), None);
        }
        assert_eq!(PowerState::value_of(Some("Paused")), None);
        assert_eq!(State::value_of(Some("Degraded")), None);
    }

    #[test]
    fn test_legend() {
        assert_eq!(Health::legend(), "1(OK),2(Warning),3(Critical)");
        assert_eq!(
            PowerState::legend(),
            "1(On),2(Off),3(PoweringOn),4(PoweringOff)"
        );
    }
}

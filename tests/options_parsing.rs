//! Options-string parsing and derivation, including property tests.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rawserial::line::{derive_attributes, LineSettings};
use rawserial::{ConfigError, Parity, PortOptions, StopBits, SUPPORTED_BAUD_RATES};

const KNOWN_KEYS: [&str; 7] = [
    "baudrate",
    "bitsperchar",
    "stopbits",
    "parity",
    "blocking",
    "autocts",
    "autorts",
];

fn derive(options: &PortOptions) -> Result<LineSettings, rawserial::DriverError> {
    let mut attrs: libc::termios = unsafe { std::mem::zeroed() };
    derive_attributes(&mut attrs, options, "/dev/ttyPROP")?;
    Ok(LineSettings::from_attributes(&attrs))
}

#[test]
fn test_null_and_empty_match_explicit_defaults() {
    let explicit = PortOptions::parse(Some(
        "baudrate=57600;bitsperchar=8;stopbits=1;parity=none;blocking=on;autocts=on;autorts=on",
    ))
    .unwrap();

    assert_eq!(PortOptions::parse(None).unwrap(), explicit);
    assert_eq!(PortOptions::parse(Some("")).unwrap(), explicit);
    assert_eq!(derive(&explicit).unwrap().to_string(), "57600 8N1 rtscts");
}

#[test]
fn test_unknown_key_keeps_earlier_pairs() {
    let (options, err) = PortOptions::parse_lenient(Some("foo=bar;baudrate=9600"));
    assert_eq!(options.baud_rate, 9600);
    assert_eq!(err, Some(ConfigError::InvalidOption("foo".to_string())));
}

#[test]
fn test_keys_are_case_sensitive() {
    let err = PortOptions::parse(Some("BaudRate=9600")).unwrap_err();
    assert_eq!(err, ConfigError::InvalidOption("BaudRate".to_string()));
}

#[test]
fn test_unsupported_baud_rate_message() {
    let options = PortOptions::parse(Some("baudrate=300")).unwrap();
    let err = derive(&options).unwrap_err();
    assert!(err.is_config());
    assert!(err.to_string().contains("Unsupported baud rate"));
}

fn parity_text() -> impl Strategy<Value = (String, Parity)> {
    prop_oneof![
        prop::sample::select(vec!["n", "N", "none", "No"])
            .prop_map(|s| (s.to_string(), Parity::None)),
        prop::sample::select(vec!["o", "O", "odd"]).prop_map(|s| (s.to_string(), Parity::Odd)),
        prop::sample::select(vec!["e", "E", "even", "Even"])
            .prop_map(|s| (s.to_string(), Parity::Even)),
    ]
}

proptest! {
    #[test]
    fn prop_parser_never_panics(input in ".{0,80}") {
        let _ = PortOptions::parse_lenient(Some(&input));
    }

    #[test]
    fn prop_valid_options_derive_requested_line(
        baud in prop::sample::select(SUPPORTED_BAUD_RATES.to_vec()),
        bits in prop::sample::select(vec![7, 8]),
        stop in prop::sample::select(vec![1, 2]),
        (parity_str, parity) in parity_text(),
        cts in any::<bool>(),
        rts in any::<bool>(),
        order in Just((0..6).collect::<Vec<usize>>()).prop_shuffle(),
    ) {
        let on_off = |b: bool| if b { "on" } else { "off" };
        let pairs = [
            format!("baudrate={baud}"),
            format!("bitsperchar={bits}"),
            format!("stopbits={stop}"),
            format!("parity={parity_str}"),
            format!("autocts={}", on_off(cts)),
            format!("autorts={}", on_off(rts)),
        ];
        let text = order.iter().map(|&i| pairs[i].as_str()).collect::<Vec<_>>().join(";");

        let options = PortOptions::parse(Some(&text)).unwrap();
        let settings = derive(&options).unwrap();

        prop_assert_eq!(settings.baud_rate, Some(baud));
        prop_assert_eq!(i32::from(settings.data_bits), bits);
        prop_assert_eq!(settings.parity, parity);
        prop_assert_eq!(settings.stop_bits, if stop == 1 { StopBits::One } else { StopBits::Two });
        prop_assert_eq!(settings.hardware_flow_control, cts && rts);
        prop_assert!(settings.raw);
        prop_assert!(!settings.software_flow_control);
    }

    #[test]
    fn prop_last_unknown_key_is_reported(
        unknown in prop::collection::vec("[a-z]{1,8}", 1..4),
        baud in prop::sample::select(SUPPORTED_BAUD_RATES.to_vec()),
    ) {
        let unknown: Vec<String> = unknown
            .into_iter()
            .filter(|k| !KNOWN_KEYS.contains(&k.as_str()))
            .collect();
        prop_assume!(!unknown.is_empty());

        let mut text = format!("baudrate={baud}");
        for key in &unknown {
            text.push_str(&format!(";{key}=x"));
        }

        let (options, err) = PortOptions::parse_lenient(Some(&text));
        prop_assert_eq!(options.baud_rate, baud);
        prop_assert_eq!(err, Some(ConfigError::InvalidOption(unknown.last().unwrap().clone())));
    }

    #[test]
    fn prop_unsupported_rates_are_rejected(baud in any::<i32>()) {
        prop_assume!(!SUPPORTED_BAUD_RATES.contains(&baud));
        let options = PortOptions::parse(Some(&format!("baudrate={baud}"))).unwrap();
        let err = derive(&options).unwrap_err();
        prop_assert_eq!(err.config_error(), Some(&ConfigError::UnsupportedBaudRate(baud)));
    }
}

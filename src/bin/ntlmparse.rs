use std::io::{Read, stdin};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use log::debug;
use ntlmparse::{
    AuthenticateMessage, ChallengeMessage, Message, NegotiateMessage, OsVersion, ParsingError,
    SecurityBuffer, decode_from_auth_header, decode_from_base64, decode_from_hex,
};


#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
enum InputFormat {
    /// Guess from the input
    Auto,
    Base64,
    Hex,
    /// HTTP authentication header value, e.g. `NTLM TlRMTVNT...`
    Header,
}

#[derive(Parser, Debug)]
#[command(name = "ntlmparse", version, about = "Decode NTLM authentication messages")]
struct Cli {
    /// Encoded message; read from stdin if omitted
    input: Option<String>,

    /// Encoding of the input
    #[arg(long, value_enum, default_value = "auto")]
    format: InputFormat,

    /// Print the decoded message as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}


fn guess_format(input: &str) -> InputFormat {
    if input.contains(' ') {
        InputFormat::Header
    } else if input.len() % 2 == 0 && input.chars().all(|c| c.is_ascii_hexdigit()) {
        InputFormat::Hex
    } else {
        InputFormat::Base64
    }
}

fn decode(input: &str, format: InputFormat) -> Result<Message, ParsingError> {
    let format = match format {
        InputFormat::Auto => guess_format(input),
        other => other,
    };
    debug!("decoding input as {:?}", format);
    match format {
        InputFormat::Auto | InputFormat::Header => decode_from_auth_header(input),
        InputFormat::Base64 => decode_from_base64(input),
        InputFormat::Hex => decode_from_hex(input),
    }
}


fn print_row(key: &str, value: &str) {
    println!("{:<24} {}", key, value);
}

fn print_sec_buffer(name: &str, sb: &SecurityBuffer, value: &str) {
    print_row(
        name,
        &format!("len={} alloc={} offset={} {:?}", sb.length, sb.allocated, sb.offset, value),
    );
}

fn print_os_version(os_version: Option<OsVersion>) {
    if let Some(v) = os_version {
        print_row("OS version", &v.long_string());
    }
}

fn print_negotiate(m: &NegotiateMessage) {
    print_sec_buffer("Supplied domain", &m.supplied_domain_secbuf, &m.supplied_domain);
    print_sec_buffer("Supplied workstation", &m.supplied_workstation_secbuf, &m.supplied_workstation);
}

fn print_challenge(m: &ChallengeMessage) {
    print_sec_buffer("Target name", &m.target_name_secbuf, &m.target_name);
    print_row("Challenge", &m.challenge_hex());
    if let Some(context) = m.context_hex() {
        print_row("Context", &context);
    }
    if let Some(sb) = &m.target_info_secbuf {
        print_row("Target info", &format!("len={} alloc={} offset={}", sb.length, sb.allocated, sb.offset));
        for attribute in &m.target_information {
            print_row(&format!("  {:?}", attribute.kind), &attribute.value.to_string());
        }
    }
}

fn print_authenticate(m: &AuthenticateMessage) {
    print_row("Layout", &format!("v{}", m.version()));
    print_sec_buffer("LM response", &m.lm_response_secbuf, &m.lm_response_hex());
    print_sec_buffer("NTLM response", &m.ntlm_response_secbuf, &m.ntlm_response_hex());
    print_sec_buffer("Domain name", &m.domain_name_secbuf, &m.domain_name);
    print_sec_buffer("User name", &m.user_name_secbuf, &m.user_name);
    print_sec_buffer("Workstation name", &m.workstation_name_secbuf, &m.workstation_name);
    if let Some(info) = m.variant.session_key_info() {
        print_sec_buffer("Session key", &info.session_key_secbuf, &hex::encode(&info.session_key));
    }
}

fn print_report(message: &Message) {
    print_row("Message", message.kind_name());
    if let Some(flags) = message.flags() {
        print_row("Flags", &format!("0x{:08x} {}", flags.bits(), flags.display_labels()));
    }
    match message {
        Message::Negotiate(m) => print_negotiate(m),
        Message::Challenge(m) => print_challenge(m),
        Message::Authenticate(m) => print_authenticate(m),
    }
    print_os_version(message.os_version());
}


fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();

    let input = match cli.input {
        Some(i) => i,
        None => {
            let mut buf = String::new();
            if let Err(e) = stdin().read_to_string(&mut buf) {
                eprintln!("failed to read stdin: {}", e);
                return ExitCode::FAILURE;
            }
            buf
        },
    };

    let message = match decode(input.trim(), cli.format) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        },
    };

    if cli.json {
        match serde_json::to_string_pretty(&message) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("failed to serialize message: {}", e);
                return ExitCode::FAILURE;
            },
        }
    } else {
        print_report(&message);
    }

    ExitCode::SUCCESS
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_guessing() {
        assert_eq!(guess_format("4e544c4d5353500001000000"), InputFormat::Hex);
        assert_eq!(guess_format("TlRMTVNTUAABAAAAB4IIogAAAAAAAAAAAAAAAAAAAAAKALpHAAAADw=="), InputFormat::Base64);
        assert_eq!(guess_format("NTLM TlRMTVNTUAABAAAA"), InputFormat::Header);
    }

    #[test]
    fn decode_any_format() {
        let message = decode("TlRMTVNTUAABAAAAB4IIogAAAAAAAAAAAAAAAAAAAAAKALpHAAAADw==", InputFormat::Auto).unwrap();
        assert_eq!(message.message_number(), 1);
        let message = decode("4e544c4d534353500001000000", InputFormat::Hex);
        assert!(message.is_err());
    }

    #[test]
    fn json_matches_report() {
        let challenge_b64 = concat!(
            "TlRMTVNTUAACAAAABgAGADgAAAA1goniaaCGDXCRRNUAAAAAAAAAAIIAggA+AAAACgC6RwAAAA9KAEwARwACAAYASgBM",
            "AEcAAQAQAEMASABPAFUAQwBIAE8AVQAEABIAagBsAGcALgBsAG8AYwBhAGwAAwAkAGMAaABvAHUAYwBoAG8AdQAuAGoA",
            "bABnAC4AbABvAGMAYQBsAAUAEgBqAGwAZwAuAGwAbwBjAGEAbAAHAAgAQH6UJ9691gEAAAAA",
        );
        let message = decode(challenge_b64, InputFormat::Base64).unwrap();
        let json = serde_json::to_value(&message).unwrap();
        let challenge = &json["Challenge"];
        assert_eq!(challenge["challenge"], "69a0860d709144d5");
        assert_eq!(challenge["context"], "0000000000000000");
        assert_eq!(challenge["flags"][0], "NTLMSSP_NEGOTIATE_UNICODE");
        assert_eq!(challenge["flags"][2], "NTLMSSP_NEGOTIATE_SIGN");
        assert_eq!(challenge["flags"].as_array().map(|a| a.len()), Some(13));

        let v2_hex = concat!(
            "4e544c4d5353500003000000180018006a00000018001800",
            "820000000c000c0040000000080008004c00000016001600",
            "54000000000000009a0000000102000044004f004d004100",
            "49004e00750073006500720057004f0052004b0053005400",
            "4100540049004f004e00c337cd5cbd44fc9782a667af6d42",
            "7c6de67c20c2d3e77c5625a98c1c31e81847466b29b2df46",
            "80f39958fb8c213a9cc6",
        );
        let message = decode(v2_hex, InputFormat::Hex).unwrap();
        let json = serde_json::to_value(&message).unwrap();
        let authenticate = &json["Authenticate"];
        assert_eq!(authenticate["lm_response"], "c337cd5cbd44fc9782a667af6d427c6de67c20c2d3e77c56");
        assert_eq!(authenticate["variant"]["V2"]["session_key"], "");
        assert_eq!(
            authenticate["variant"]["V2"]["flags"],
            serde_json::json!(["NTLMSSP_NEGOTIATE_UNICODE", "NTLMSSP_NEGOTIATE_NTLM"]),
        );
    }

    #[test]
    fn cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}

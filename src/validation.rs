//! Transfer form validation
//!
//! Validates the raw form input (token selection, recipient, amount text,
//! message) and accumulates every failure in one pass, so a UI can mark all
//! offending fields at once instead of stopping at the first problem.
//! Validation is purely local; no network round trips happen here.

use serde::{Deserialize, Serialize};

use crate::amount::{AmountError, FixedAmount};
use crate::chain::AddressValidator;
use crate::session::Network;
use crate::token::{NATIVE_DECIMALS, TokenDescriptor};

/// Maximum message length in UTF-16 code units. Wallets hand the message to
/// interfaces that measure length in UTF-16, so a single astral-plane
/// character spends two units.
pub const MESSAGE_MAX_UNITS: usize = 255;

// ============================================================================
// Form Input
// ============================================================================

/// Raw transfer form state, exactly as typed. Amount stays a string until
/// validation parses it; the engine never stores a float.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransferForm {
    pub token: Option<TokenDescriptor>,
    pub recipient: String,
    pub amount: String,
    pub message: String,
}

impl TransferForm {
    /// Clear every field back to the pristine state.
    pub fn reset(&mut self) {
        self.token = None;
        self.recipient.clear();
        self.amount.clear();
        self.message.clear();
    }

    /// Scale used to parse the amount text: the selected token's decimals,
    /// or the native scale when nothing is selected yet (syntax and
    /// positivity are still checked in that case).
    pub fn amount_scale(&self) -> u8 {
        self.token
            .as_ref()
            .map(|t| t.decimals)
            .unwrap_or(NATIVE_DECIMALS)
    }
}

// ============================================================================
// Validation Errors
// ============================================================================

/// Form field an error is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Token,
    Recipient,
    Amount,
    Message,
}

/// One validation failure. `validate` returns every failure found, not just
/// the first.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("no token selected")]
    TokenNotSelected,

    #[error("recipient address is required")]
    RecipientMissing,

    #[error("recipient address is not valid on {network}")]
    RecipientInvalid { network: Network },

    #[error("amount is required")]
    AmountMissing,

    #[error("amount '{value}' is not a valid number")]
    AmountMalformed { value: String },

    #[error("amount must be greater than zero")]
    AmountNotPositive,

    #[error("amount uses more than {max} decimal places")]
    AmountTooPrecise { max: u8 },

    #[error("amount exceeds the available {symbol} balance")]
    AmountAboveBalance { symbol: String },

    #[error("message exceeds 255 UTF-16 code units (got {units})")]
    MessageTooLong { units: usize },
}

impl ValidationError {
    /// Field this error belongs to, for per-field display.
    pub fn field(&self) -> Field {
        match self {
            ValidationError::TokenNotSelected => Field::Token,
            ValidationError::RecipientMissing | ValidationError::RecipientInvalid { .. } => {
                Field::Recipient
            }
            ValidationError::AmountMissing
            | ValidationError::AmountMalformed { .. }
            | ValidationError::AmountNotPositive
            | ValidationError::AmountTooPrecise { .. }
            | ValidationError::AmountAboveBalance { .. } => Field::Amount,
            ValidationError::MessageTooLong { .. } => Field::Message,
        }
    }
}

// ============================================================================
// Validation Pass
// ============================================================================

/// Validated, parsed transfer input. Produced only when [`prepare`] finds no
/// errors; the recipient is trimmed and the amount parsed at the token's
/// scale, so downstream code never re-parses form text.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedTransfer {
    pub token: TokenDescriptor,
    pub recipient: String,
    pub amount: FixedAmount,
    pub message: String,
}

/// Check the whole form in one pass: either every field is acceptable and a
/// [`PreparedTransfer`] comes back, or the full set of failures does.
///
/// The balance cap is an exact smallest-unit integer comparison at the
/// token's scale; fees are not considered here (that happens at
/// reconciliation, after the quote arrives).
pub fn prepare(
    form: &TransferForm,
    network: Network,
    validator: &dyn AddressValidator,
) -> Result<PreparedTransfer, Vec<ValidationError>> {
    let mut errors = Vec::new();

    if form.token.is_none() {
        errors.push(ValidationError::TokenNotSelected);
    }

    let recipient = form.recipient.trim();
    if recipient.is_empty() {
        errors.push(ValidationError::RecipientMissing);
    } else if !validator.is_valid(recipient, network) {
        errors.push(ValidationError::RecipientInvalid { network });
    }

    let amount = form.amount.trim();
    let mut parsed = None;
    if amount.is_empty() {
        errors.push(ValidationError::AmountMissing);
    } else {
        let scale = form.amount_scale();
        match FixedAmount::parse(amount, scale) {
            Ok(value) => {
                if value.is_zero() {
                    errors.push(ValidationError::AmountNotPositive);
                } else if let Some(token) = &form.token
                    && value.exceeds(&token.balance)
                {
                    errors.push(ValidationError::AmountAboveBalance {
                        symbol: token.symbol.clone(),
                    });
                } else {
                    parsed = Some(value);
                }
            }
            Err(AmountError::PrecisionOverflow { max, .. }) => {
                errors.push(ValidationError::AmountTooPrecise { max: max as u8 });
            }
            Err(_) => {
                errors.push(ValidationError::AmountMalformed {
                    value: amount.to_string(),
                });
            }
        }
    }

    let units = form.message.encode_utf16().count();
    if units > MESSAGE_MAX_UNITS {
        errors.push(ValidationError::MessageTooLong { units });
    }

    match (form.token.clone(), parsed) {
        (Some(token), Some(amount)) if errors.is_empty() => Ok(PreparedTransfer {
            token,
            recipient: recipient.to_string(),
            amount,
            message: form.message.clone(),
        }),
        _ => Err(errors),
    }
}

/// Validate the form and return every failure; empty means ready for fee
/// estimation.
pub fn validate(
    form: &TransferForm,
    network: Network,
    validator: &dyn AddressValidator,
) -> Vec<ValidationError> {
    match prepare(form, network, validator) {
        Ok(_) => Vec::new(),
        Err(errors) => errors,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::HexAddressValidator;
    use crate::token::TokenKind;

    const GOOD_ADDR: &str = "0x25b9fa2b62f56a0bb9c5bac2b5bea8cbd41f90cc";

    fn native(balance: &str) -> TokenDescriptor {
        TokenDescriptor::native(
            "NAT",
            FixedAmount::parse(balance, NATIVE_DECIMALS).unwrap(),
        )
    }

    fn form(token: Option<TokenDescriptor>, recipient: &str, amount: &str) -> TransferForm {
        TransferForm {
            token,
            recipient: recipient.to_string(),
            amount: amount.to_string(),
            message: String::new(),
        }
    }

    fn run(form: &TransferForm) -> Vec<ValidationError> {
        validate(form, Network::Testnet, &HexAddressValidator)
    }

    #[test]
    fn test_valid_form_passes() {
        let f = form(Some(native("10")), GOOD_ADDR, "2.5");
        assert!(run(&f).is_empty());
    }

    #[test]
    fn test_empty_form_accumulates_errors() {
        // No token, no recipient, zero amount: three independent failures
        // reported together.
        let f = form(None, "", "0");
        let errors = run(&f);
        assert!(errors.len() >= 3, "got {errors:?}");
        assert!(errors.contains(&ValidationError::TokenNotSelected));
        assert!(errors.contains(&ValidationError::RecipientMissing));
        assert!(errors.contains(&ValidationError::AmountNotPositive));
    }

    #[test]
    fn test_recipient_format_checked() {
        let f = form(Some(native("10")), "not-an-address", "1");
        let errors = run(&f);
        assert_eq!(
            errors,
            vec![ValidationError::RecipientInvalid {
                network: Network::Testnet
            }]
        );

        // Surrounding whitespace is tolerated around a valid address.
        let f = form(Some(native("10")), &format!("  {GOOD_ADDR}  "), "1");
        assert!(run(&f).is_empty());
    }

    #[test]
    fn test_amount_must_be_numeric() {
        for bad in ["abc", "1.2.3", "1,5", "-1", ".5", "1."] {
            let f = form(Some(native("10")), GOOD_ADDR, bad);
            let errors = run(&f);
            assert_eq!(
                errors,
                vec![ValidationError::AmountMalformed {
                    value: bad.to_string()
                }],
                "input {bad:?}"
            );
        }
    }

    #[test]
    fn test_amount_must_be_positive() {
        for zero in ["0", "0.0", "0.000000000000000000"] {
            let f = form(Some(native("10")), GOOD_ADDR, zero);
            assert_eq!(run(&f), vec![ValidationError::AmountNotPositive]);
        }
    }

    #[test]
    fn test_amount_within_balance() {
        let f = form(Some(native("10")), GOOD_ADDR, "10.000000000000000001");
        assert_eq!(
            run(&f),
            vec![ValidationError::AmountAboveBalance {
                symbol: "NAT".to_string()
            }]
        );

        // Exactly the balance is fine; reconciliation handles the fee.
        let f = form(Some(native("10")), GOOD_ADDR, "10");
        assert!(run(&f).is_empty());
    }

    #[test]
    fn test_amount_precision_capped_by_token() {
        let token = TokenDescriptor::standard(
            "USDX",
            "0x00000000000000000000000000000000000000f3",
            6,
            TokenKind::SeparateFeeToken,
            FixedAmount::parse("100", 6).unwrap(),
        );
        let f = form(Some(token), GOOD_ADDR, "1.0000001");
        assert_eq!(run(&f), vec![ValidationError::AmountTooPrecise { max: 6 }]);
    }

    #[test]
    fn test_message_utf16_limit() {
        let mut f = form(Some(native("10")), GOOD_ADDR, "1");

        f.message = "a".repeat(MESSAGE_MAX_UNITS);
        assert!(run(&f).is_empty());

        f.message = "a".repeat(MESSAGE_MAX_UNITS + 1);
        assert_eq!(run(&f), vec![ValidationError::MessageTooLong { units: 256 }]);

        // Astral-plane characters count as two units each.
        f.message = "🚀".repeat(128);
        assert_eq!(run(&f), vec![ValidationError::MessageTooLong { units: 256 }]);

        f.message = format!("{}a", "🚀".repeat(127));
        assert!(run(&f).is_empty());
    }

    #[test]
    fn test_no_token_still_checks_amount_syntax() {
        // Without a token the amount is parsed at the native scale, so
        // syntax and positivity failures surface immediately.
        let f = form(None, GOOD_ADDR, "nope");
        let errors = run(&f);
        assert!(errors.contains(&ValidationError::TokenNotSelected));
        assert!(errors.contains(&ValidationError::AmountMalformed {
            value: "nope".to_string()
        }));
    }

    #[test]
    fn test_errors_key_to_fields() {
        assert_eq!(ValidationError::TokenNotSelected.field(), Field::Token);
        assert_eq!(ValidationError::RecipientMissing.field(), Field::Recipient);
        assert_eq!(
            ValidationError::RecipientInvalid {
                network: Network::Mainnet
            }
            .field(),
            Field::Recipient
        );
        assert_eq!(ValidationError::AmountMissing.field(), Field::Amount);
        assert_eq!(ValidationError::AmountNotPositive.field(), Field::Amount);
        assert_eq!(
            ValidationError::MessageTooLong { units: 300 }.field(),
            Field::Message
        );
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut f = form(Some(native("10")), GOOD_ADDR, "1");
        f.message = "thanks".to_string();
        f.reset();
        assert_eq!(f, TransferForm::default());
    }

    #[test]
    fn test_prepare_returns_parsed_payload() {
        let mut f = form(Some(native("10")), &format!(" {GOOD_ADDR} "), "2.50");
        f.message = "rent".to_string();

        let prepared = prepare(&f, Network::Testnet, &HexAddressValidator).unwrap();
        assert_eq!(prepared.recipient, GOOD_ADDR);
        assert_eq!(prepared.amount, FixedAmount::parse("2.5", NATIVE_DECIMALS).unwrap());
        assert_eq!(prepared.message, "rent");
        assert_eq!(prepared.token.symbol, "NAT");
    }

    #[test]
    fn test_prepare_rejects_with_all_errors() {
        let f = form(None, "bogus", "-3");
        let errors = prepare(&f, Network::Testnet, &HexAddressValidator).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}

// 入站验签服务
// 校验网关回调的渠道、签名、响应码与订单号，全部通过后生成授权事件

use std::collections::BTreeMap;
use rust_decimal::Decimal;
use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::models::{
    callback_field, AuthorizedEvent, CallbackOutcome, IncomingCallback, GATEWAY_MODULE,
    PAYMETHOD_LABEL,
};
use crate::services::OrderStore;
use crate::utils::{constant_time_eq, parse_order_ref, signature_digest, OrderRef};

/// 入站验签器
#[derive(Debug, Clone)]
pub struct InboundVerifier {
    module_id: String,
    secret_key: String,
    require_signature: bool,
}

impl InboundVerifier {
    /// 创建验签器，缺少密钥时直接失败
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        if config.secret_key.trim().is_empty() {
            return Err(GatewayError::MissingSecretKey);
        }

        Ok(Self {
            module_id: config.module_id.clone(),
            secret_key: config.secret_key.clone(),
            require_signature: config.require_signature,
        })
    }

    pub fn module_id(&self) -> &str {
        &self.module_id
    }

    /// 回调是否属于本渠道
    pub fn is_own_channel(&self, callback: &IncomingCallback) -> bool {
        self.owns_channel(callback.channel.as_deref())
    }

    /// `rmtpay` 参数是否指向本渠道
    pub fn owns_channel(&self, channel: Option<&str>) -> bool {
        channel == Some(self.module_id.as_str())
    }

    /// 处理一次回调
    ///
    /// 依次执行: 渠道识别、验签、响应码检查、订单解析。任一步失败即终止，
    /// 订单状态只有在全部通过时才会推进。
    pub fn verify<S>(&self, callback: &IncomingCallback, orders: &S) -> CallbackOutcome
    where
        S: OrderStore + ?Sized,
    {
        if !self.is_own_channel(callback) {
            log::debug!("Ignoring callback for channel {:?}", callback.channel);
            return CallbackOutcome::Ignored;
        }

        match self.authorize(callback, orders) {
            Ok(event) => CallbackOutcome::Authorized(event),
            Err(e) => {
                log::warn!(
                    "CharityClear callback rejected ({}) for orderRef {:?}",
                    e.kind(),
                    callback.order_ref()
                );
                CallbackOutcome::Rejected(e)
            }
        }
    }

    fn authorize<S>(&self, callback: &IncomingCallback, orders: &S) -> Result<AuthorizedEvent, GatewayError>
    where
        S: OrderStore + ?Sized,
    {
        self.verify_signature(&callback.fields)?;
        check_response_code(callback.field(callback_field::RESPONSE_CODE))?;

        let order_id = match parse_order_ref(callback.order_ref()) {
            OrderRef::Missing => return Err(GatewayError::MissingOrderReference),
            OrderRef::Invalid(raw) => return Err(GatewayError::UnknownOrder { order_ref: raw }),
            OrderRef::Id(id) => id,
        };
        let order = orders.resolve_order(order_id).ok_or_else(|| GatewayError::UnknownOrder {
            order_ref: order_id.to_string(),
        })?;

        let transaction_id = callback.field(callback_field::XREF).unwrap_or_default();
        if transaction_id.is_empty() {
            log::warn!("CharityClear callback for order {} carries no xref", order.id);
        }

        Ok(AuthorizedEvent {
            order_id: order.id,
            transaction_id: transaction_id.to_string(),
            amount: callback_amount(callback),
            gateway: GATEWAY_MODULE.to_string(),
            paymethod: PAYMETHOD_LABEL.to_string(),
            capture: true,
        })
    }

    /// 校验回调签名
    ///
    /// 签名可带 `|字段名列表` 后缀，此时列表必须与收到的字段 (去掉签名后) 的排序键一致。
    /// 未携带签名时，仅在 `require_signature` 关闭时放行。
    pub fn verify_signature(&self, fields: &BTreeMap<String, String>) -> Result<(), GatewayError> {
        let mut fields = fields.clone();
        let provided = match fields.remove(callback_field::SIGNATURE) {
            Some(signature) => signature,
            None if self.require_signature => return Err(GatewayError::SignatureMismatch),
            None => return Ok(()),
        };

        let (digest, signed_names) = match provided.split_once('|') {
            Some((digest, names)) => (digest, Some(names)),
            None => (provided.as_str(), None),
        };

        if let Some(names) = signed_names {
            let expected = fields.keys().map(String::as_str).collect::<Vec<_>>().join(",");
            if !constant_time_eq(names, &expected) {
                return Err(GatewayError::SignatureMismatch);
            }
        }

        let expected = signature_digest(&fields, &self.secret_key);
        if !constant_time_eq(digest, &expected) {
            return Err(GatewayError::SignatureMismatch);
        }

        Ok(())
    }
}

/// 响应码: 缺失或为0视为成功，其余 (含无法解析) 视为拒付
fn check_response_code(raw: Option<&str>) -> Result<(), GatewayError> {
    match raw {
        None => Ok(()),
        Some(code) if code.trim().parse::<i64>() == Ok(0) => Ok(()),
        Some(code) => Err(GatewayError::GatewayDeclined {
            response_code: code.to_string(),
        }),
    }
}

/// 授权金额 (最小单位 / 100)
fn callback_amount(callback: &IncomingCallback) -> Decimal {
    let raw = callback
        .field(callback_field::AMMOUNT)
        .or_else(|| callback.field(callback_field::AMOUNT));

    match raw.map(|s| s.trim().parse::<i64>()) {
        Some(Ok(minor_units)) => Decimal::new(minor_units, 2),
        Some(Err(_)) | None => {
            log::warn!(
                "CharityClear callback for orderRef {:?} has no usable amount, recording 0",
                callback.order_ref()
            );
            Decimal::ZERO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use proptest::prelude::*;
    use crate::config::Config;
    use crate::models::{BillingAddress, CustomerContact, Order};
    use crate::services::outbound_signer::sign_fields;
    use crate::services::InMemoryOrderStore;

    const SECRET: &str = "Circle4Take40Idea";

    fn test_config() -> GatewayConfig {
        let mut config = Config::default().gateway;
        config.secret_key = SECRET.to_string();
        config
    }

    fn verifier() -> InboundVerifier {
        InboundVerifier::new(&test_config()).unwrap()
    }

    fn store() -> InMemoryOrderStore {
        let store = InMemoryOrderStore::new();
        store.insert(Order::new(
            42,
            Decimal::from_str("19.99").unwrap(),
            BillingAddress::default(),
            CustomerContact::default(),
        ));
        store
    }

    fn gateway_fields(response_code: &str) -> BTreeMap<String, String> {
        [
            ("responseCode", response_code),
            ("responseMessage", "AUTHCODE:123456"),
            ("orderRef", "42"),
            ("xref", "13021713NK57ML36FH11RZQ"),
            ("ammount", "1999"),
            ("transactionUnique", "101626-143005-42"),
            ("customerAddress", "1 High Street\nFlat 2\nLeeds"),
            ("customerName", "Jane Doe"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    fn signed(mut fields: BTreeMap<String, String>) -> BTreeMap<String, String> {
        let signature = sign_fields(&fields, SECRET);
        fields.insert("signature".to_string(), signature);
        fields
    }

    fn callback(fields: BTreeMap<String, String>) -> IncomingCallback {
        IncomingCallback::new(Some("charityclear".to_string()), fields)
    }

    #[test]
    fn test_new_requires_secret() {
        let config = Config::default().gateway;
        assert_eq!(InboundVerifier::new(&config).unwrap_err(), GatewayError::MissingSecretKey);
    }

    #[test]
    fn test_signed_fields_verify() {
        let verifier = verifier();
        assert!(verifier.verify_signature(&signed(gateway_fields("0"))).is_ok());

        let mut awkward = BTreeMap::new();
        awkward.insert("customerAddress".to_string(), "Flat *2*\r\n~Rue d'Été\r".to_string());
        awkward.insert("note".to_string(), "50% off & more = yes".to_string());
        awkward.insert("empty".to_string(), String::new());
        assert!(verifier.verify_signature(&signed(awkward)).is_ok());

        assert!(verifier.verify_signature(&signed(BTreeMap::new())).is_ok());
    }

    #[test]
    fn test_bare_digest_verifies() {
        let mut fields = gateway_fields("0");
        let digest = signature_digest(&fields, SECRET);
        fields.insert("signature".to_string(), digest);
        assert!(verifier().verify_signature(&fields).is_ok());
    }

    #[test]
    fn test_any_single_field_tamper_fails() {
        let verifier = verifier();
        let original = signed(gateway_fields("0"));

        for key in original.keys() {
            let mut tampered = original.clone();
            tampered.get_mut(key).unwrap().push('x');
            assert_eq!(
                verifier.verify_signature(&tampered),
                Err(GatewayError::SignatureMismatch),
                "tampered {}",
                key
            );
        }

        let mut removed = original.clone();
        removed.remove("ammount");
        assert_eq!(verifier.verify_signature(&removed), Err(GatewayError::SignatureMismatch));

        let mut added = original.clone();
        added.insert("extra".to_string(), "1".to_string());
        assert_eq!(verifier.verify_signature(&added), Err(GatewayError::SignatureMismatch));
    }

    #[test]
    fn test_wrong_secret_fails() {
        let mut fields = gateway_fields("0");
        let signature = sign_fields(&fields, "another-secret");
        fields.insert("signature".to_string(), signature);
        assert_eq!(verifier().verify_signature(&fields), Err(GatewayError::SignatureMismatch));
    }

    #[test]
    fn test_newline_encoding_is_normalized() {
        // 网关按 \n 签名，回传时地址换行变成 \r\n
        let mut fields = signed(gateway_fields("0"));
        fields.insert(
            "customerAddress".to_string(),
            "1 High Street\r\nFlat 2\r\nLeeds".to_string(),
        );
        assert!(verifier().verify_signature(&fields).is_ok());
    }

    #[test]
    fn test_missing_signature() {
        let fields = gateway_fields("0");
        assert_eq!(verifier().verify_signature(&fields), Err(GatewayError::SignatureMismatch));

        let mut config = test_config();
        config.require_signature = false;
        let lenient = InboundVerifier::new(&config).unwrap();
        assert!(lenient.verify_signature(&fields).is_ok());
        // 提供了签名时仍然校验
        let mut forged = fields.clone();
        forged.insert("signature".to_string(), "00".to_string());
        assert_eq!(lenient.verify_signature(&forged), Err(GatewayError::SignatureMismatch));
    }

    #[test]
    fn test_success_emits_authorization() {
        let store = store();
        let outcome = verifier().verify(&callback(signed(gateway_fields("0"))), &store);

        assert_eq!(
            outcome,
            CallbackOutcome::Authorized(AuthorizedEvent {
                order_id: 42,
                transaction_id: "13021713NK57ML36FH11RZQ".to_string(),
                amount: Decimal::from_str("19.99").unwrap(),
                gateway: "CharityClear".to_string(),
                paymethod: "Charity Clear".to_string(),
                capture: true,
            })
        );
        // 验签本身不修改订单
        assert!(store.events(42).is_empty());
    }

    #[test]
    fn test_nonzero_response_code_is_declined() {
        let outcome = verifier().verify(&callback(signed(gateway_fields("5"))), &store());
        assert_eq!(
            outcome,
            CallbackOutcome::Rejected(GatewayError::GatewayDeclined {
                response_code: "5".to_string()
            })
        );

        let outcome = verifier().verify(&callback(signed(gateway_fields("n/a"))), &store());
        assert!(matches!(
            outcome,
            CallbackOutcome::Rejected(GatewayError::GatewayDeclined { .. })
        ));
    }

    #[test]
    fn test_tampered_signature_is_rejected_before_response_code() {
        let mut fields = signed(gateway_fields("5"));
        fields.insert("ammount".to_string(), "1".to_string());
        let outcome = verifier().verify(&callback(fields), &store());
        assert_eq!(outcome, CallbackOutcome::Rejected(GatewayError::SignatureMismatch));
    }

    #[test]
    fn test_missing_order_ref() {
        let mut fields = gateway_fields("0");
        fields.remove("orderRef");
        let outcome = verifier().verify(&callback(signed(fields)), &store());
        assert_eq!(outcome, CallbackOutcome::Rejected(GatewayError::MissingOrderReference));

        let mut fields = gateway_fields("0");
        fields.insert("orderRef".to_string(), "0".to_string());
        let outcome = verifier().verify(&callback(signed(fields)), &store());
        assert_eq!(outcome, CallbackOutcome::Rejected(GatewayError::MissingOrderReference));
    }

    #[test]
    fn test_unknown_order() {
        let mut fields = gateway_fields("0");
        fields.insert("orderRef".to_string(), "43".to_string());
        let outcome = verifier().verify(&callback(signed(fields)), &store());
        assert_eq!(
            outcome,
            CallbackOutcome::Rejected(GatewayError::UnknownOrder { order_ref: "43".to_string() })
        );

        let mut fields = gateway_fields("0");
        fields.insert("orderRef".to_string(), "order-42".to_string());
        let outcome = verifier().verify(&callback(signed(fields)), &store());
        assert!(matches!(outcome, CallbackOutcome::Rejected(GatewayError::UnknownOrder { .. })));
    }

    #[test]
    fn test_other_channel_is_ignored() {
        let fields = signed(gateway_fields("0"));
        let verifier = verifier();

        let other = IncomingCallback::new(Some("paypalstandard".to_string()), fields.clone());
        assert_eq!(verifier.verify(&other, &store()), CallbackOutcome::Ignored);

        let none = IncomingCallback::new(None, fields);
        assert_eq!(verifier.verify(&none, &store()), CallbackOutcome::Ignored);
    }

    #[test]
    fn test_amount_falls_back_to_amount_field() {
        let mut fields = gateway_fields("0");
        fields.remove("ammount");
        fields.insert("amount".to_string(), "2500".to_string());
        match verifier().verify(&callback(signed(fields)), &store()) {
            CallbackOutcome::Authorized(event) => assert_eq!(event.amount, Decimal::new(2500, 2)),
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    fn field_key() -> impl Strategy<Value = String> {
        r"[a-zA-Z0-9\r\n*~+%|,.éü€]{1,8}".prop_filter("signature is reserved", |k| k != "signature")
    }

    fn field_value() -> impl Strategy<Value = String> {
        r"[a-zA-Z0-9 \r\n*~+%|,&=.éü€]{0,12}"
    }

    fn field_map() -> impl Strategy<Value = BTreeMap<String, String>> {
        prop::collection::btree_map(field_key(), field_value(), 0..8)
    }

    fn verifier_with(secret: &str) -> InboundVerifier {
        let mut config = test_config();
        config.secret_key = secret.to_string();
        InboundVerifier::new(&config).unwrap()
    }

    fn signed_with(mut fields: BTreeMap<String, String>, secret: &str) -> BTreeMap<String, String> {
        let signature = sign_fields(&fields, secret);
        fields.insert("signature".to_string(), signature);
        fields
    }

    proptest! {
        /// 任意字段集合签名后都能通过验签
        #[test]
        fn signed_fields_always_verify(fields in field_map(), secret in "[!-~]{1,24}") {
            let verifier = verifier_with(&secret);
            prop_assert_eq!(verifier.verify_signature(&signed_with(fields, &secret)), Ok(()));
        }

        /// 修改任一字段值后验签失败
        #[test]
        fn changed_value_fails(
            fields in field_map(),
            secret in "[!-~]{1,24}",
            pick in any::<prop::sample::Index>(),
        ) {
            prop_assume!(!fields.is_empty());
            let key = fields.keys().nth(pick.index(fields.len())).cloned().unwrap();

            let mut tampered = signed_with(fields, &secret);
            tampered.get_mut(&key).unwrap().push('x');
            prop_assert_eq!(
                verifier_with(&secret).verify_signature(&tampered),
                Err(GatewayError::SignatureMismatch)
            );
        }

        /// 删除任一字段后验签失败
        #[test]
        fn removed_field_fails(
            fields in field_map(),
            secret in "[!-~]{1,24}",
            pick in any::<prop::sample::Index>(),
        ) {
            prop_assume!(!fields.is_empty());
            let key = fields.keys().nth(pick.index(fields.len())).cloned().unwrap();

            let mut tampered = signed_with(fields, &secret);
            tampered.remove(&key);
            prop_assert_eq!(
                verifier_with(&secret).verify_signature(&tampered),
                Err(GatewayError::SignatureMismatch)
            );
        }

        /// 追加未签名字段后验签失败
        #[test]
        fn added_field_fails(
            fields in field_map(),
            secret in "[!-~]{1,24}",
            extra_key in field_key(),
            extra_value in field_value(),
        ) {
            prop_assume!(!fields.contains_key(&extra_key));

            let mut tampered = signed_with(fields, &secret);
            tampered.insert(extra_key, extra_value);
            prop_assert_eq!(
                verifier_with(&secret).verify_signature(&tampered),
                Err(GatewayError::SignatureMismatch)
            );
        }
    }
}

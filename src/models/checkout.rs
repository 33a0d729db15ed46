// 结账数据模型
// 定义发往网关的签名字段集合及其输入

use std::collections::BTreeMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 网关字段名
pub mod field {
    pub const ACTION: &str = "action";
    pub const AMOUNT: &str = "amount";
    pub const CUSTOMER_ADDRESS: &str = "customerAddress";
    pub const CUSTOMER_EMAIL: &str = "customerEmail";
    pub const CUSTOMER_NAME: &str = "customerName";
    pub const CUSTOMER_PHONE: &str = "customerPhone";
    pub const CUSTOMER_POSTCODE: &str = "customerPostcode";
    pub const MERCHANT_ID: &str = "merchantID";
    pub const ORDER_REF: &str = "orderRef";
    pub const REDIRECT_URL: &str = "redirectURL";
    pub const SIGNATURE: &str = "signature";
    pub const TRANSACTION_UNIQUE: &str = "transactionUnique";
    pub const TYPE: &str = "type";
}

/// 账单地址
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BillingAddress {
    pub name: String,
    pub address: String,
    pub xaddress: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub postcode: String,
}

impl BillingAddress {
    /// 网关要求的多行地址: 地址、附加地址、城市、州/省、国家，以换行连接
    pub fn composed_address(&self) -> String {
        [
            self.address.as_str(),
            self.xaddress.as_str(),
            self.city.as_str(),
            self.state.as_str(),
            self.country.as_str(),
        ]
        .join("\n")
    }
}

/// 客户联系方式
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CustomerContact {
    pub email: String,
    pub phone: String,
}

/// 一次结账尝试的上下文
#[derive(Debug, Clone)]
pub struct CheckoutContext {
    /// 商户订单号
    pub order_id: u64,
    /// 订单总额 (主货币单位)
    pub total: Decimal,
    pub billing: BillingAddress,
    pub customer: CustomerContact,
    /// 网关回调地址
    pub return_url: String,
}

/// 交易动作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TransactionAction {
    Sale,
}

impl TransactionAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionAction::Sale => "SALE",
        }
    }
}

/// 交易渠道类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TransactionType {
    /// 电子商务
    Ecommerce,
    /// 邮件/电话订购 (客服代客下单)
    Moto,
}

impl TransactionType {
    pub fn code(&self) -> u8 {
        match self {
            TransactionType::Ecommerce => 1,
            TransactionType::Moto => 2,
        }
    }
}

/// 发往网关的支付请求 (签名前)
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingPayment {
    pub merchant_id: u64,
    /// 最小货币单位金额 (分)
    pub amount_minor_units: i64,
    /// 交易唯一标识 `MMDDYY-HHMMSS-订单号`
    pub transaction_unique: String,
    pub action: TransactionAction,
    pub transaction_type: TransactionType,
    pub redirect_url: String,
    pub order_ref: u64,
    /// 原样透传的客户字段
    pub customer_fields: BTreeMap<String, String>,
}

impl OutgoingPayment {
    /// 展开为按键排序的网关字段
    pub fn to_fields(&self) -> BTreeMap<String, String> {
        let mut fields = self.customer_fields.clone();
        fields.insert(field::MERCHANT_ID.to_string(), self.merchant_id.to_string());
        fields.insert(field::AMOUNT.to_string(), self.amount_minor_units.to_string());
        fields.insert(field::TRANSACTION_UNIQUE.to_string(), self.transaction_unique.clone());
        fields.insert(field::ACTION.to_string(), self.action.as_str().to_string());
        fields.insert(field::TYPE.to_string(), self.transaction_type.code().to_string());
        fields.insert(field::REDIRECT_URL.to_string(), self.redirect_url.clone());
        fields.insert(field::ORDER_REF.to_string(), self.order_ref.to_string());
        fields
    }
}

/// 已签名的字段集合
#[derive(Debug, Clone, Serialize)]
pub struct SignedPayment {
    /// 按键排序的字段，不含签名
    pub fields: BTreeMap<String, String>,
    /// `摘要|字段名列表`
    pub signature: String,
}

impl SignedPayment {
    /// 签名中的摘要部分
    pub fn digest(&self) -> &str {
        self.signature
            .split_once('|')
            .map(|(digest, _)| digest)
            .unwrap_or(&self.signature)
    }

    /// 签名覆盖的字段名 (签名后缀中的顺序)
    pub fn signed_field_names(&self) -> Vec<&str> {
        self.signature
            .split_once('|')
            .map(|(_, names)| names.split(',').collect())
            .unwrap_or_default()
    }

    /// 表单提交顺序的字段，签名在最后
    pub fn form_fields(&self) -> Vec<(String, String)> {
        let mut fields: Vec<(String, String)> = self
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        fields.push((field::SIGNATURE.to_string(), self.signature.clone()));
        fields
    }
}

/// 签名字段查询响应
#[derive(Debug, Serialize)]
pub struct CheckoutFieldsResponse {
    /// 表单提交目标
    pub action_url: String,
    /// 表单字段 (签名在最后)
    pub fields: Vec<(String, String)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composed_address() {
        let billing = BillingAddress {
            address: "1 High Street".to_string(),
            xaddress: "".to_string(),
            city: "Leeds".to_string(),
            state: "West Yorkshire".to_string(),
            country: "GB".to_string(),
            ..Default::default()
        };
        assert_eq!(billing.composed_address(), "1 High Street\n\nLeeds\nWest Yorkshire\nGB");
    }

    #[test]
    fn test_signed_payment_accessors() {
        let mut fields = BTreeMap::new();
        fields.insert("amount".to_string(), "100".to_string());
        fields.insert("action".to_string(), "SALE".to_string());
        let signed = SignedPayment {
            fields,
            signature: "deadbeef|action,amount".to_string(),
        };

        assert_eq!(signed.digest(), "deadbeef");
        assert_eq!(signed.signed_field_names(), vec!["action", "amount"]);

        let form = signed.form_fields();
        assert_eq!(form.first().unwrap().0, "action");
        assert_eq!(form.last().unwrap(), &("signature".to_string(), "deadbeef|action,amount".to_string()));
    }
}

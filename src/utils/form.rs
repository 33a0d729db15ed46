// 跳转表单渲染
// 将签名字段渲染为自动提交到网关托管支付页的HTML表单

/// HTML转义 (属性值与文本通用)
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// 渲染自动提交表单
///
/// # Arguments
/// * `form_id` - 表单元素ID
/// * `action_url` - 网关支付页地址
/// * `fields` - 按提交顺序排列的字段 (签名在最后)
///
/// # Returns
/// * 完整的HTML页面
pub fn render_redirect_form(form_id: &str, action_url: &str, fields: &[(String, String)]) -> String {
    let id = escape_html(form_id);
    let inputs: String = fields
        .iter()
        .map(|(name, value)| {
            format!(
                "<input type=\"hidden\" name=\"{}\" value=\"{}\" />\n",
                escape_html(name),
                escape_html(value)
            )
        })
        .collect();

    format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\" />\
         <title>Sending order to Charity Clear&hellip;</title></head><body>\n\
         <form id=\"{id}\" action=\"{action}\" method=\"POST\">\n\
         {inputs}\
         <h1>Sending order to Charity Clear&hellip;</h1>\n\
         <noscript>\
         <p>Click the &quot;Submit Order to Charity Clear&quot; button below to submit your order to Charity Clear for payment processing:</p>\
         <p><input type=\"submit\" name=\"submit\" value=\"Submit Order to Charity Clear\" /></p>\
         </noscript>\n\
         </form>\n\
         <script type=\"text/javascript\">document.getElementById(\"{id}\").submit();</script>\n\
         </body></html>\n",
        id = id,
        action = escape_html(action_url),
        inputs = inputs,
    )
}

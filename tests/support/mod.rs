//! Shared helpers for the integration tests.

#![allow(dead_code)]

pub mod socket_guard;

/// Player profile page as the site serves it.
pub fn player_data_page(name: &str, rating: u32) -> String {
    let img = "https://maimaidx.jp/maimai-mobile/img";
    format!(
        r#"<!DOCTYPE html>
<html lang="ja"><head><meta charset="utf-8"><title>maimai DX NET</title></head>
<body><div class="main_wrapper t_c">
<div class="see_through_block m_15 m_t_0 p_10 p_r t_l f_0">
<img src="{img}/Icon/icon.png" class="w_112 f_l">
<div class="p_l_10 f_l">
  <div class="trophy_block trophy_Normal p_3 t_c f_0">
    <div class="trophy_inner_block f_13"><span>でらっくす</span></div></div>
  <div class="m_b_5"><div class="name_block f_l f_16">{name}</div></div>
  <div class="rating_block">{rating}</div>
  <img src="{img}/class/class_rank_s_00.png" class="p_l_10 h_35 f_l">
</div>
</div>
<div class="m_5 m_t_10 t_r f_12">maimaiDX total play count：1,042</div>
</div></body></html>"#
    )
}

/// Login page with a POST form to `submit/`.
pub fn login_page() -> String {
    r#"<!DOCTYPE html>
<html><head><title>login</title></head><body>
<form action="submit/" method="post">
  <input type="text" name="segaId" value="">
  <input type="password" name="password">
  <input type="hidden" name="token" value="csrf-token">
  <button type="submit">login</button>
</form>
</body></html>"#
        .to_string()
}

/// The canonical error page showing `code`.
pub fn error_page(code: u32) -> String {
    format!(
        r#"<!DOCTYPE html>
<html><body><div class="main_wrapper t_c">
<div class="container_red p_10">
  <div class="p_5 f_14">ERROR CODE：{code}</div>
  <div class="p_5 f_12 gray break">An error has occurred.</div>
</div>
</div></body></html>"#
    )
}

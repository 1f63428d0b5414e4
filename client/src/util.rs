fn random_u32() -> u32 {
    (js_sys::Math::random() * (u32::MAX as f64 + 1.0)) as u32
}

pub fn make_sender_name() -> String {
    format!("sketcher-{:04x}", random_u32() & 0xffff)
}

pub fn now_ms() -> u64 {
    js_sys::Date::now() as u64
}

pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

/// Blend straight-alpha `src` over an opaque `dst` channel value.
pub(crate) fn blend_channel(dst: u8, src: u8, alpha: u8) -> u8 {
    let a = u16::from(alpha);
    let inv = 255 - a;
    mul_div255_u8(u16::from(src), a).saturating_add(mul_div255_u8(u16::from(dst), inv))
}

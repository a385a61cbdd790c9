//! Built-in format table: `(key, width, height)`.

#[rustfmt::skip]
pub(crate) const ENTRIES: &[(&str, u32, u32)] = &[
    ("Logo.png",                       300,  300),
    ("Smalllogo.png",                  136,  136),
    ("KDlogo.png",                     140,  112),
    ("RPTlogo.bmp",                    155,  110),
    ("PRINTLOGO.bmp",                  600,  256),
    ("Feature Graphic.png",           1024,  500),
    ("hpns.png",                        96,   96),
    ("loginLogo.png",                  600,  600),
    ("logo.png",                       300,  300),
    ("logo@2x.png",                    300,  300),
    ("logo@3x.png",                    300,  300),
    ("appicon-60.png",                  60,   60),
    ("appicon-60@2x.png",              120,  120),
    ("appicon-60@3x.png",              180,  180),
    ("appicon.png",                     57,   57),
    ("appicon-512.png",                512,  512),
    ("appicon@2x.png",                 114,  114),
    ("default_app_logo.png",           512,  512),
    ("DefaultIcon.png",               1024, 1024),
    ("default-large.png",              640, 1136),
    ("Default-568h@2x.png",            640, 1136),
    ("Default-677h@2x.png",            750, 1334),
    ("Default-736h@3x.png",           1242, 2208),
    ("Default-Portrait-1792h@2x.png",  828, 1792),
    ("Default-Portrait-2436h@3x.png", 1125, 2436),
    ("Default-Portrait-2688h@3x.png", 1242, 2688),
    ("Default.png",                    640,  980),
    ("Default@2x.png",                1242, 1902),
    ("CarryoutBtn.png",                300,  300),
    ("DeliveryBtn.png",                300,  300),
    ("FutureBtn.png",                  300,  300),
    ("NowBtn.png",                     300,  300),
];

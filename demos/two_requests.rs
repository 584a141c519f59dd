use http::header::{COOKIE, SET_COOKIE};
use http::{HeaderMap, HeaderValue};
use persistent_cart::cookies::HeaderCookieTransport;
use persistent_cart::{CartCookie, CookieError, CookieModel, CookieRestriction, CookieValueStore, SessionConfig};

fn main() -> Result<(), CookieError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();

    let config = SessionConfig::builder()
        .cookie_lifetime(86_400)
        .cookie_domain("shop.example.com")
        .build()
        .expect("session config is not valid");

    // First request: no cookies yet, the visitor adds something to the cart.
    let transport = HeaderCookieTransport::from_request(&HeaderMap::new());
    let restriction = CookieRestriction::from_transport(false, &transport);
    let mut cart = CartCookie::new(CookieValueStore::from_config(transport, config.clone(), restriction));

    cart.read_cookie()?
        .set_quote_id(Some(1001))
        .add_item("TSHIRT-M", 2)
        .write_cookie()?;

    let (store, _) = cart.into_inner();
    let mut response = HeaderMap::new();
    store.into_transport().commit(&mut response);

    let set_cookie = response.get(SET_COOKIE).expect("cart cookie was written");
    println!("response 1: Set-Cookie: {}", set_cookie.to_str().unwrap_or_default());

    // Second request: the browser sends the cookie back.
    let pair = set_cookie
        .to_str()
        .unwrap_or_default()
        .split(';')
        .next()
        .unwrap_or_default()
        .to_string();
    let mut request = HeaderMap::new();
    request.insert(COOKIE, HeaderValue::from_str(&pair).expect("valid cookie header"));

    let transport = HeaderCookieTransport::from_request(&request);
    let restriction = CookieRestriction::from_transport(false, &transport);
    let mut cart = CartCookie::new(CookieValueStore::from_config(transport, config, restriction));
    cart.read_cookie()?;

    println!("request 2: restored cart {:?}", cart.snapshot());
    Ok(())
}

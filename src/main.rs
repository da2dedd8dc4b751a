#[rocket::launch]
fn rocket() -> _ {
    chirpy_server::rocket()
}

use leptos::*;

use crate::lookup::CenterDetails;

#[component]
pub fn CenterCard(center: CenterDetails) -> impl IntoView {
    let CenterDetails {
        name,
        address,
        contact,
        opening_hours,
        description,
    } = center;

    view! {
      <div class="card">
        <h3>{ name }</h3>
        <p><strong>"Address:"</strong>" "{ address }</p>
        <p><strong>"Contact:"</strong>" "{ contact }</p>
        <p><strong>"Opening hours:"</strong>" "{ opening_hours }</p>
        <p><strong>"Description:"</strong>" "{ description }</p>
      </div>
    }
}

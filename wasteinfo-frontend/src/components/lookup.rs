use leptos::{html::Input, leptos_dom::helpers::WindowListenerHandle, *};

use wasteinfo_frontend_api::PublicApi;

use crate::{
    autocomplete::{BindingTime, PlaceAutocomplete},
    components::CenterCard,
    geolocation::BrowserGeolocation,
    lookup::{lookup_current_location, lookup_typed_location, BusyGuard, LookupState},
    LOADING_SPINNER_ID, LOCATION_INPUT_ID, RESULT_ID,
};

#[derive(Debug, Clone)]
enum Submission {
    TypedLocation(String),
    CurrentLocation,
}

#[component]
pub fn LocationLookup(public_api: PublicApi) -> impl IntoView {
    // -- signals -- //

    let state = RwSignal::new(LookupState::default());
    let input_ref = create_node_ref::<Input>();
    let autocomplete = StoredValue::new(None::<PlaceAutocomplete>);
    let page_load_listener = StoredValue::new(None::<WindowListenerHandle>);

    // -- actions -- //

    let lookup_action = Action::new(move |submission: &Submission| {
        let submission = submission.clone();
        let api = public_api.clone();
        async move {
            let Some(ticket) = state.try_update(LookupState::start) else {
                return;
            };
            let _busy = BusyGuard::new(ticket, move |ticket| {
                _ = state.try_update(|s| s.release(ticket));
            });
            let outcome = match submission {
                Submission::TypedLocation(text) => lookup_typed_location(&api, &text).await,
                Submission::CurrentLocation => {
                    lookup_current_location(&api, &BrowserGeolocation).await
                }
            };
            state.update(|s| {
                if !s.finish(ticket, outcome) {
                    log::debug!("Discard outcome of superseded lookup {ticket}");
                }
            });
        }
    });

    // -- callbacks -- //

    let submit_typed_location = move || {
        let text = input_ref
            .get_untracked()
            .map(|input| input.value())
            .unwrap_or_default();
        lookup_action.dispatch(Submission::TypedLocation(text));
    };

    let submit_current_location = move || {
        lookup_action.dispatch(Submission::CurrentLocation);
    };

    // -- init autocomplete -- //

    let bind_autocomplete = move |input: &web_sys::HtmlInputElement| {
        if autocomplete.with_value(Option::is_some) {
            return;
        }
        match PlaceAutocomplete::bind(input) {
            Ok(handle) => autocomplete.set_value(Some(handle)),
            Err(err) => log::warn!("Places autocomplete is not available: {err}"),
        }
    };

    input_ref.on_load(move |input| {
        let input: web_sys::HtmlInputElement = (*input).clone();
        match BindingTime::current() {
            BindingTime::Now => bind_autocomplete(&input),
            BindingTime::OnPageLoad => {
                log::debug!("Bind places autocomplete after the page has been loaded");
                let handle = window_event_listener(ev::load, move |_| {
                    bind_autocomplete(&input);
                    page_load_listener.update_value(|listener| {
                        if let Some(listener) = listener.take() {
                            listener.remove();
                        }
                    });
                });
                page_load_listener.set_value(Some(handle));
            }
        }
    });

    let busy = Signal::derive(move || state.with(|s| s.busy));

    view! {
      <section>
        <div class="container p-6 mx-auto">
          <div class="flex items-center justify-center">
            <input
              id=LOCATION_INPUT_ID
              node_ref=input_ref
              type="text"
              class="w-full max-w-md py-3 px-4 bg-gray-50 text-gray-700 outline-none rounded"
              placeholder="Enter your city or address"
              on:keyup = move |ev| {
                match &*ev.key() {
                  "Enter" => submit_typed_location(),
                  "Escape" => {
                    event_target::<web_sys::HtmlInputElement>(&ev).set_value("");
                  }
                  _ => { /* nothing to do */ }
                }
              }
            />
            <button class="ml-2 py-3 px-4 rounded" on:click=move |_| submit_typed_location()>
              "Search"
            </button>
            <button class="ml-2 py-3 px-4 rounded" on:click=move |_| submit_current_location()>
              "Use my location"
            </button>
            <span
              id=LOADING_SPINNER_ID
              class="loading-spinner ml-2"
              style:display=move || if busy.get() { "inline-block" } else { "none" }
            ></span>
          </div>
          <div id=RESULT_ID>
            { move || state.with(LookupState::message).map(|msg| view! { <p>{ msg }</p> }) }
            { move || {
                state
                  .with(LookupState::cards)
                  .into_iter()
                  .map(|center| view! { <CenterCard center /> })
                  .collect_view()
              }
            }
          </div>
        </div>
      </section>
    }
}
